//! Frame-loop facade: session + timers + collaborators
//!
//! The window layer owns one `Game` and per frame:
//!   1. forwards input through `handle_input`
//!   2. calls `advance` with the wall-clock time since the last frame
//!   3. renders the latest `Snapshot` (borrowed from `subscribe`)
//!
//! All game-state mutation happens on the caller's thread. The snapshot is
//! published once per frame, after every spawn and tick of that frame has been
//! applied. High score writes are handed to a `HighScoreWriter` thread.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use racers_common::{Difficulty, Tuning};
use tokio::sync::watch;

use crate::audio::{AudioSink, Channel, Clip, Track};
use crate::save::{HighScoreStore, HighScoreWriter};
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::session::{GameSession, SessionState, TickOutcome};
use crate::snapshot::Snapshot;

/// Everything the player can ask for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Horizontal drag (pixels); turns the wheel relative to its angle
    Steer { drag_dx: f32 },
    Accelerate,
    Brake,
    NudgeLeft,
    NudgeRight,
    TogglePause,
    Restart,
    /// Only honoured from the pause menu
    SelectDifficulty(Difficulty),
}

/// What happened during one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub spawned: u32,
    /// Final score, if the run ended this frame
    pub crashed: Option<u32>,
}

pub struct Game {
    session: GameSession,
    scheduler: Scheduler,
    rng: StdRng,
    audio: Box<dyn AudioSink>,
    writer: HighScoreWriter,
    high_score: u32,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Game {
    pub fn new(
        tuning: &Tuning,
        difficulty: Difficulty,
        seed: Option<u64>,
        mut audio: Box<dyn AudioSink>,
        store: Box<dyn HighScoreStore + Send>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => {
                tracing::info!("Using fixed seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let session = GameSession::with_difficulty(tuning, difficulty);
        let scheduler = Scheduler::new(SchedulerConfig::from_tuning(tuning), &mut rng);
        let high_score = store.read_high_score();
        let writer = HighScoreWriter::spawn(store);

        audio.set_volume(Channel::Engine, 0.0);
        audio.start_loop(Track::BackgroundMusic);

        let (snapshot_tx, _) = watch::channel(session.snapshot(high_score));

        tracing::info!(
            "Game ready: difficulty {}, high score {}",
            difficulty,
            high_score
        );

        Self {
            session,
            scheduler,
            rng,
            audio,
            writer,
            high_score,
            snapshot_tx,
        }
    }

    /// Receiver for the per-frame snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current snapshot, built fresh
    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot(self.high_score)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // -----------------------------------------------------------------------
    // Frame step
    // -----------------------------------------------------------------------

    /// Run every spawn and tick that fell due in `elapsed`, then publish
    pub fn advance(&mut self, elapsed: Duration) -> FrameReport {
        let due = self
            .scheduler
            .advance(elapsed, self.session.is_running(), &mut self.rng);

        let mut report = FrameReport::default();

        for _ in 0..due.spawns {
            if self.session.spawn_traffic(&mut self.rng).is_some() {
                report.spawned += 1;
            }
        }

        for _ in 0..due.ticks {
            match self.session.tick() {
                TickOutcome::Advanced => report.ticks += 1,
                TickOutcome::Crashed { score, .. } => {
                    report.ticks += 1;
                    report.crashed = Some(score);
                    self.on_crash(score);
                    break;
                }
                TickOutcome::Skipped => break,
            }
        }

        self.publish();
        report
    }

    fn on_crash(&mut self, score: u32) {
        self.scheduler.cancel();
        self.audio.set_volume(Channel::Engine, 0.0);
        self.audio.play_once(Clip::Crash);

        if score > self.high_score {
            self.high_score = score;
            self.writer.submit(score);
            tracing::info!("New high score: {}", score);
        }
        tracing::info!("Game over at {} (best {})", score, self.high_score);
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.snapshot(self.high_score));
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Apply one input. Returns whether it changed anything.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let applied = match event {
            InputEvent::Steer { drag_dx } => self.session.steer_by_drag(drag_dx),
            InputEvent::Accelerate => {
                let ok = self.session.accelerate();
                if ok {
                    self.update_engine_sound();
                }
                ok
            }
            InputEvent::Brake => {
                let ok = self.session.brake();
                if ok {
                    self.update_engine_sound();
                }
                ok
            }
            InputEvent::NudgeLeft => self.session.nudge_left(),
            InputEvent::NudgeRight => self.session.nudge_right(),
            InputEvent::TogglePause => self.toggle_pause(),
            InputEvent::Restart => {
                self.restart();
                true
            }
            InputEvent::SelectDifficulty(difficulty) => self.session.set_difficulty(difficulty),
        };

        if applied {
            self.publish();
        }
        applied
    }

    fn update_engine_sound(&mut self) {
        let level = self.session.player().speed_fraction();
        self.audio.start_loop(Track::Engine);
        self.audio.set_volume(Channel::Engine, level);
    }

    fn toggle_pause(&mut self) -> bool {
        let before = self.session.state();
        let after = self.session.toggle_pause();
        match after {
            SessionState::Paused => {
                self.audio.set_volume(Channel::Music, 0.3);
                self.audio.set_volume(Channel::Effects, 0.0);
            }
            SessionState::Running => {
                self.audio.set_volume(Channel::Music, 1.0);
                self.audio.set_volume(Channel::Effects, 1.0);
            }
            SessionState::GameOver => {}
        }
        before != after
    }

    /// New run with the same difficulty and high score
    pub fn restart(&mut self) {
        self.session.reset();
        self.scheduler.rearm(&mut self.rng);
        self.audio.set_volume(Channel::Engine, 0.0);
        self.audio.set_volume(Channel::Music, 1.0);
        self.audio.set_volume(Channel::Effects, 1.0);
        self.audio.start_loop(Track::BackgroundMusic);
        self.publish();
    }

    /// Stop the timers, release audio and wait for pending high score
    /// writes. Call once when the window closes.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel();
        self.audio.release_all();
        self.writer.finish();
        tracing::info!("Game shut down (high score {})", self.high_score);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
