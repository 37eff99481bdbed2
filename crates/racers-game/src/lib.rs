//! Racers game core
//!
//! Everything that decides what happens in a run, independent of any window
//! or audio device:
//!   driving    — player car kinematics (accelerate, brake, steer, decay)
//!   traffic    — AI car spawner, per-tick movement and despawn
//!   collision  — axis-aligned hit-box overlap
//!   session    — score, game speed, difficulty, Running/Paused/GameOver
//!   scheduler  — fixed-step tick timer and randomized spawn timer
//!   snapshot   — read-only frame view handed to the renderer
//!   save       — persisted high score
//!   audio      — sound collaborator interface
//!   game       — wires the above together for the frame loop

pub mod audio;
pub mod collision;
pub mod driving;
pub mod game;
pub mod save;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod traffic;

pub use audio::{AudioSink, Channel, Clip, SilentAudio, Track};
pub use game::{FrameReport, Game, InputEvent};
pub use save::{HighScoreFile, HighScoreStore, HighScoreWriter, MemoryHighScore, StoreError};
pub use session::{GameSession, SessionState, TickOutcome};
pub use snapshot::Snapshot;

pub use racers_common::{Difficulty, Tuning};
