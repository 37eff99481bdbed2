//! Framebuffer renderer — draws one `Snapshot`
//!
//! World coordinates map 1:1 to screen pixels, with world x = 0 at the
//! horizontal centre of the screen. Draw order: track, traffic, player,
//! speed lines, HUD, then the pause / game-over overlay.

use racers_game::traffic::{AiCar, Behavior, CarColor, Lane};
use racers_game::driving::{PLAYER_HEIGHT, PLAYER_WIDTH};
use racers_game::{Difficulty, Snapshot};

use super::font;
use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

const GRASS: u32 = 0xFF2E7D32;
const ROAD: u32 = 0xFF505050;
const ROAD_EDGE: u32 = 0xFFEEEEEE;
const LANE_DASH: u32 = 0xFFFFFFFF;
const PLAYER_BODY: u32 = 0xFF1E88E5;
const PLAYER_GLASS: u32 = 0xFF90CAF9;
const HUD_TEXT: u32 = 0xFFFFFFFF;
const HUD_ACCENT: u32 = 0xFFFFFF00;

/// Half width of the paved road
const ROAD_HALF_WIDTH: f32 = 160.0;
const DASH_LENGTH: i32 = 24;
const DASH_PERIOD: i32 = 48;

/// Screen column of a world x coordinate
pub fn screen_x(world_x: f32) -> i32 {
    (SCREEN_WIDTH as f32 / 2.0 + world_x).round() as i32
}

pub fn screen_y(world_y: f32) -> i32 {
    world_y.round() as i32
}

fn car_color(color: CarColor) -> u32 {
    match color {
        CarColor::Yellow => 0xFFFDD835,
        CarColor::Magenta => 0xFFD81B60,
        CarColor::Cyan => 0xFF00ACC1,
        CarColor::White => 0xFFF5F5F5,
    }
}

fn behavior_color(behavior: Behavior) -> u32 {
    match behavior {
        Behavior::Aggressive => 0xFFE53935,
        Behavior::Normal => 0xFFFFEB3B,
        Behavior::Cautious => 0xFF43A047,
    }
}

/// Divide every channel by 3
fn darken(fb: &mut [u32]) {
    for pixel in fb.iter_mut() {
        let r = (*pixel >> 16) & 0xFF;
        let g = (*pixel >> 8) & 0xFF;
        let b = *pixel & 0xFF;
        *pixel = 0xFF000000 | ((r / 3) << 16) | ((g / 3) << 8) | (b / 3);
    }
}

/// Rectangle centred on a world position
fn fill_centered(fb: &mut [u32], cx: f32, cy: f32, w: f32, h: f32, color: u32) {
    let x = screen_x(cx - w / 2.0);
    let y = screen_y(cy - h / 2.0);
    font::draw_rect(fb, x, y, w.round() as i32, h.round() as i32, color);
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

pub fn draw_frame(fb: &mut [u32], snap: &Snapshot) {
    draw_track(fb, snap.track_offset());
    for car in &snap.cars {
        draw_ai_car(fb, car);
    }
    draw_player(fb, snap);
    draw_speed_lines(fb, snap);
    draw_hud(fb, snap);

    if snap.game_over() {
        draw_game_over(fb, snap);
    } else if snap.paused() {
        draw_pause_menu(fb, snap.difficulty);
    }
}

fn draw_track(fb: &mut [u32], offset: f32) {
    fb.fill(GRASS);

    let left = screen_x(-ROAD_HALF_WIDTH);
    let width = (ROAD_HALF_WIDTH * 2.0) as i32;
    font::draw_rect(fb, left, 0, width, SCREEN_HEIGHT as i32, ROAD);
    font::draw_rect(fb, left - 4, 0, 4, SCREEN_HEIGHT as i32, ROAD_EDGE);
    font::draw_rect(fb, left + width, 0, 4, SCREEN_HEIGHT as i32, ROAD_EDGE);

    // Dashed dividers halfway between lanes, scrolling toward the player
    let shift = (offset as i32).rem_euclid(DASH_PERIOD);
    let dividers = [
        (Lane::Left.x() + Lane::Center.x()) / 2.0,
        (Lane::Center.x() + Lane::Right.x()) / 2.0,
    ];
    for divider in dividers {
        let x = screen_x(divider) - 2;
        let mut y = shift - DASH_PERIOD;
        while y < SCREEN_HEIGHT as i32 {
            font::draw_rect(fb, x, y, 4, DASH_LENGTH, LANE_DASH);
            y += DASH_PERIOD;
        }
    }
}

fn draw_ai_car(fb: &mut [u32], car: &AiCar) {
    let (w, h) = car.size.dimensions();
    fill_centered(fb, car.x, car.y, w, h, car_color(car.color));
    font::draw_rect_outline(
        fb,
        screen_x(car.x - w / 2.0),
        screen_y(car.y - h / 2.0),
        w as i32,
        h as i32,
        0xFF202020,
    );
    // Rear window
    fill_centered(fb, car.x, car.y - h / 4.0, w * 0.6, h * 0.15, 0xFF37474F);
    // Behaviour indicator
    fill_centered(fb, car.x, car.y + h / 4.0, 8.0, 8.0, behavior_color(car.behavior));
}

fn draw_player(fb: &mut [u32], snap: &Snapshot) {
    let p = &snap.player;
    fill_centered(fb, p.x, p.y, PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_BODY);
    fill_centered(
        fb,
        p.x,
        p.y - PLAYER_HEIGHT / 4.0,
        PLAYER_WIDTH * 0.7,
        PLAYER_HEIGHT * 0.2,
        PLAYER_GLASS,
    );
    // Wheel marker leans with the steering angle
    let lean = p.steering_angle / 45.0 * (PLAYER_WIDTH / 2.0 - 4.0);
    fill_centered(fb, p.x + lean, p.y + PLAYER_HEIGHT / 4.0, 6.0, 6.0, 0xFFFFFFFF);
}

/// Streaks on the verges, more and longer the faster the player goes
fn draw_speed_lines(fb: &mut [u32], snap: &Snapshot) {
    let fraction = snap.player.speed_fraction();
    if fraction < 0.2 {
        return;
    }
    let count = (fraction * 8.0).round() as i32;
    let length = (20.0 + fraction * 60.0) as i32;
    let scroll = (snap.tick as i32).wrapping_mul(12);
    let verge = screen_x(-ROAD_HALF_WIDTH) - 8;

    for i in 0..count {
        let y = (scroll + i * 97).rem_euclid(SCREEN_HEIGHT as i32 + length) - length;
        let inset = (i * 13) % 60;
        font::draw_rect(fb, verge - inset, y, 2, length, 0x80FFFFFF);
        font::draw_rect(
            fb,
            SCREEN_WIDTH as i32 - verge + inset,
            y,
            2,
            length,
            0x80FFFFFF,
        );
    }
}

// ---------------------------------------------------------------------------
// HUD & overlays
// ---------------------------------------------------------------------------

fn draw_hud(fb: &mut [u32], snap: &Snapshot) {
    font::draw_rect(fb, 0, 0, SCREEN_WIDTH as i32, 34, 0xFF101018);

    font::draw_text_shadow(fb, 8, 6, &format!("SCORE {}", snap.score), HUD_TEXT);
    font::draw_text_shadow(fb, 8, 20, &format!("BEST {}", snap.high_score), HUD_ACCENT);

    let speed = format!("{} KM/H", snap.player.speed_kmh());
    let right = SCREEN_WIDTH as i32 - 8;
    font::draw_text_shadow(fb, right - font::text_width(&speed), 6, &speed, HUD_TEXT);
    let level = format!("{} X{:.1}", snap.difficulty.display_name(), snap.game_speed);
    font::draw_text_shadow(fb, right - font::text_width(&level), 20, &level, HUD_ACCENT);

    // Speed bar along the bottom edge
    let bar_w = 200;
    let bar_x = (SCREEN_WIDTH as i32 - bar_w) / 2;
    let bar_y = SCREEN_HEIGHT as i32 - 16;
    font::draw_rect(fb, bar_x, bar_y, bar_w, 8, 0xFF202020);
    let filled = (snap.player.speed_fraction() * bar_w as f32) as i32;
    font::draw_rect(fb, bar_x, bar_y, filled, 8, 0xFF66BB6A);
    font::draw_rect_outline(fb, bar_x - 1, bar_y - 1, bar_w + 2, 10, 0xFFBBBBBB);
}

fn draw_panel(fb: &mut [u32], w: i32, h: i32) -> (i32, i32) {
    darken(fb);
    let x = (SCREEN_WIDTH as i32 - w) / 2;
    let y = (SCREEN_HEIGHT as i32 - h) / 2;
    font::draw_rect(fb, x, y, w, h, 0xFF1A1A2E);
    font::draw_rect_outline(fb, x, y, w, h, 0xFF6666CC);
    font::draw_rect_outline(fb, x + 2, y + 2, w - 4, h - 4, 0xFF444488);
    (x, y)
}

fn draw_pause_menu(fb: &mut [u32], current: Difficulty) {
    let (box_x, box_y) = draw_panel(fb, 260, 190);
    font::draw_text_centered(fb, box_y + 14, "PAUSED", HUD_ACCENT);
    font::draw_text_centered(fb, box_y + 40, "DIFFICULTY", 0xFFBBBBBB);

    for (i, level) in Difficulty::all().iter().enumerate() {
        let iy = box_y + 62 + i as i32 * 24;
        let selected = *level == current;
        if selected {
            font::draw_rect(fb, box_x + 6, iy - 4, 248, 18, 0xFF333366);
        }
        let prefix = if selected { "> " } else { "  " };
        let text = format!("{}{} {}", prefix, i + 1, level.display_name());
        let color = if selected { HUD_ACCENT } else { 0xFFBBBBBB };
        font::draw_text_shadow(fb, box_x + 60, iy, &text, color);
    }

    font::draw_text_centered(fb, box_y + 146, "P RESUME", 0xFF9999BB);
    font::draw_text_centered(fb, box_y + 162, "R RESTART", 0xFF9999BB);
}

fn draw_game_over(fb: &mut [u32], snap: &Snapshot) {
    let (_, box_y) = draw_panel(fb, 260, 150);
    font::draw_text_centered(fb, box_y + 16, "GAME OVER", 0xFFE53935);
    font::draw_text_centered(fb, box_y + 46, &format!("SCORE {}", snap.score), HUD_TEXT);
    font::draw_text_centered(fb, box_y + 64, &format!("BEST {}", snap.high_score), HUD_ACCENT);
    if snap.score > 0 && snap.score >= snap.high_score {
        font::draw_text_centered(fb, box_y + 86, "NEW BEST!", 0xFF66BB6A);
    }
    font::draw_text_centered(fb, box_y + 120, "R RESTART", 0xFF9999BB);
}
