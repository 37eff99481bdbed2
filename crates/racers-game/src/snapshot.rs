//! Read-only view of one frame, handed to the renderer

use racers_common::Difficulty;

use crate::session::SessionState;
use crate::traffic::AiCar;

/// Player fields the renderer needs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub steering_angle: f32,
}

impl PlayerView {
    /// Speedometer reading (speed × 100)
    pub fn speed_kmh(&self) -> u32 {
        (self.speed * 100.0).round() as u32
    }

    pub fn speed_fraction(&self) -> f32 {
        if self.max_speed > 0.0 {
            (self.speed / self.max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Everything drawn in a frame, captured after all of the frame's updates
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Ticks simulated since the session started
    pub tick: u64,
    pub player: PlayerView,
    pub score: u32,
    pub high_score: u32,
    pub state: SessionState,
    pub difficulty: Difficulty,
    pub game_speed: f32,
    pub cars: Vec<AiCar>,
}

impl Snapshot {
    pub fn paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    /// Scroll offset of the centre-line dashes
    pub fn track_offset(&self) -> f32 {
        self.score as f32 * self.game_speed
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            player: PlayerView::default(),
            score: 0,
            high_score: 0,
            state: SessionState::Running,
            difficulty: Difficulty::Normal,
            game_speed: 1.0,
            cars: Vec::new(),
        }
    }
}
