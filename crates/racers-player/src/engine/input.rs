//! Keyboard / mouse → `InputEvent`
//!
//! Held keys (Up, Down, Left, Right) repeat every frame; everything else
//! fires once per press. Mouse drag with the left button steers by the
//! horizontal distance moved since the previous frame.

use minifb::Key;
use racers_game::{Difficulty, InputEvent};

/// Drag distance fed per frame while an arrow key is held
pub const KEY_STEER_DRAG: f32 = 6.0;

/// Events for held keys
pub fn held_events(held: &[Key]) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for key in held {
        match key {
            Key::Up | Key::W => events.push(InputEvent::Accelerate),
            Key::Down | Key::S => events.push(InputEvent::Brake),
            Key::Left => events.push(InputEvent::Steer {
                drag_dx: -KEY_STEER_DRAG,
            }),
            Key::Right => events.push(InputEvent::Steer {
                drag_dx: KEY_STEER_DRAG,
            }),
            _ => {}
        }
    }
    events
}

/// Events for keys pressed this frame
pub fn pressed_events(pressed: &[Key]) -> Vec<InputEvent> {
    pressed
        .iter()
        .filter_map(|key| match key {
            Key::A => Some(InputEvent::NudgeLeft),
            Key::D => Some(InputEvent::NudgeRight),
            Key::P | Key::Escape | Key::Space => Some(InputEvent::TogglePause),
            Key::R | Key::Enter => Some(InputEvent::Restart),
            Key::Key1 | Key::NumPad1 => Some(InputEvent::SelectDifficulty(Difficulty::Easy)),
            Key::Key2 | Key::NumPad2 => Some(InputEvent::SelectDifficulty(Difficulty::Normal)),
            Key::Key3 | Key::NumPad3 => Some(InputEvent::SelectDifficulty(Difficulty::Hard)),
            _ => None,
        })
        .collect()
}

/// Turns mouse positions into per-frame drag deltas
#[derive(Debug, Default)]
pub struct DragTracker {
    last_x: Option<f32>,
}

impl DragTracker {
    /// `x` is in logical pixels. Returns a steer event while dragging.
    pub fn update(&mut self, button_down: bool, x: Option<f32>) -> Option<InputEvent> {
        let (true, Some(x)) = (button_down, x) else {
            self.last_x = None;
            return None;
        };
        let previous = self.last_x.replace(x)?;
        let drag_dx = x - previous;
        (drag_dx != 0.0).then_some(InputEvent::Steer { drag_dx })
    }
}
