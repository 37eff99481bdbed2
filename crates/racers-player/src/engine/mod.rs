//! Game engine — minifb window, input, and frame loop.
//!
//! Uses a 480×640 pixel framebuffer with 32-bit ARGB pixels; minifb scales
//! it to the window.

pub mod font;
pub mod input;
pub mod render;
pub mod sound_engine;

use std::time::Instant;

use anyhow::Result;
use minifb::{KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};
use racers_game::Game;

pub const SCREEN_WIDTH: usize = 480;
pub const SCREEN_HEIGHT: usize = 640;
const FPS: usize = 60;

/// Run the frame loop until the window is closed
pub fn run(game: &mut Game, scale: usize) -> Result<()> {
    let options = WindowOptions {
        resize: true,
        scale_mode: ScaleMode::AspectRatioStretch,
        ..Default::default()
    };
    let mut window = Window::new(
        "Racers",
        SCREEN_WIDTH * scale,
        SCREEN_HEIGHT * scale,
        options,
    )
    .map_err(|e| anyhow::anyhow!("Window creation failed: {}", e))?;
    window.set_target_fps(FPS);

    let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let snapshots = game.subscribe();
    let mut drag = input::DragTracker::default();
    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;

    tracing::info!("Engine initialized, entering game loop");
    tracing::info!("Controls: arrows/drag=drive | A/D=nudge | P=pause | 1-3=difficulty | R=restart");

    while window.is_open() {
        // Input
        let mut events = input::pressed_events(&window.get_keys_pressed(KeyRepeat::No));
        events.extend(input::held_events(&window.get_keys()));

        // Mouse → logical pixels
        let (out_w, _) = window.get_size();
        let mouse_x = window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, _)| x * SCREEN_WIDTH as f32 / out_w.max(1) as f32);
        let mouse_down = window.get_mouse_down(MouseButton::Left);
        events.extend(drag.update(mouse_down, mouse_x));

        for event in events {
            game.handle_input(event);
        }

        // Simulation
        let now = Instant::now();
        let report = game.advance(now - last_frame);
        last_frame = now;
        if let Some(score) = report.crashed {
            tracing::info!("Crash! Final score {}", score);
        }

        // Render
        let snap = snapshots.borrow();
        render::draw_frame(&mut framebuffer, &snap);

        frame_count += 1;
        if frame_count % 5 == 0 {
            let state = if snap.game_over() {
                " | GAME OVER"
            } else if snap.paused() {
                " | PAUSED"
            } else {
                ""
            };
            window.set_title(&format!(
                "Racers – Score {} | Best {} | {} km/h | {}{}",
                snap.score,
                snap.high_score,
                snap.player.speed_kmh(),
                snap.difficulty,
                state
            ));
        }
        drop(snap);

        window
            .update_with_buffer(&framebuffer, SCREEN_WIDTH, SCREEN_HEIGHT)
            .map_err(|e| anyhow::anyhow!("Display error: {}", e))?;
    }

    tracing::info!("Engine shutdown");
    Ok(())
}
