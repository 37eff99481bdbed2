//! One playthrough: score, game speed, difficulty and lifecycle
//!
//! State machine:
//!
//! ```text
//!   Running --pause--> Paused --resume--> Running
//!   Running --collision--> GameOver --reset--> Running
//! ```
//!
//! Ordering inside a tick: score, player decay, traffic movement/despawn,
//! collision check. Spawns are applied between ticks, never while the car
//! list is being iterated.

use rand::Rng;
use racers_common::{Difficulty, Tuning};

use crate::collision::first_collision;
use crate::driving::{DriveProperties, PlayerCar, PLAYER_Y};
use crate::snapshot::{PlayerView, Snapshot};
use crate::traffic::{AiCar, Traffic};

/// Every this many points the game speeds up
pub const SCORE_STEP: u32 = 100;
/// Game-speed increase per score step
pub const GAME_SPEED_STEP: f32 = 0.2;
/// Game speed of a fresh session
pub const BASE_GAME_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Running,
    Paused,
    GameOver,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Session paused or over; nothing changed
    Skipped,
    Advanced,
    /// The player hit a car; the session is now over
    Crashed { score: u32, car_id: u64 },
}

/// All state of the running game, owned in one place
#[derive(Debug, Clone)]
pub struct GameSession {
    player: PlayerCar,
    traffic: Traffic,
    score: u32,
    game_speed: f32,
    difficulty: Difficulty,
    state: SessionState,
    ticks: u64,
}

impl GameSession {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: PlayerCar::new(DriveProperties::from_tuning(tuning)),
            traffic: Traffic::new(),
            score: 0,
            game_speed: BASE_GAME_SPEED,
            difficulty: Difficulty::Normal,
            state: SessionState::Running,
            ticks: 0,
        }
    }

    /// A fresh session whose difficulty was picked before the first run
    pub fn with_difficulty(tuning: &Tuning, difficulty: Difficulty) -> Self {
        let mut session = Self::new(tuning);
        session.difficulty = difficulty;
        session.game_speed = difficulty.game_speed();
        session
    }

    pub fn player(&self) -> &PlayerCar {
        &self.player
    }

    pub fn cars(&self) -> &[AiCar] {
        self.traffic.cars()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn game_speed(&self) -> f32 {
        self.game_speed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    // -----------------------------------------------------------------------
    // Player input — ignored unless the session is running
    // -----------------------------------------------------------------------

    pub fn accelerate(&mut self) -> bool {
        self.when_running(PlayerCar::accelerate)
    }

    pub fn brake(&mut self) -> bool {
        self.when_running(PlayerCar::brake)
    }

    pub fn steer(&mut self, target_angle: f32) -> bool {
        self.when_running(|car| car.steer(target_angle))
    }

    pub fn steer_by_drag(&mut self, drag_dx: f32) -> bool {
        self.when_running(|car| car.steer_by_drag(drag_dx))
    }

    pub fn nudge_left(&mut self) -> bool {
        self.when_running(PlayerCar::nudge_left)
    }

    pub fn nudge_right(&mut self) -> bool {
        self.when_running(PlayerCar::nudge_right)
    }

    fn when_running(&mut self, f: impl FnOnce(&mut PlayerCar)) -> bool {
        if !self.is_running() {
            return false;
        }
        f(&mut self.player);
        true
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Advance the game by one fixed step
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Skipped;
        }
        self.ticks = self.ticks.saturating_add(1);

        self.score = self.score.saturating_add(1);
        if self.score % SCORE_STEP == 0 {
            self.game_speed += GAME_SPEED_STEP;
            tracing::debug!("Score {} → game speed {:.1}", self.score, self.game_speed);
        }

        self.player.update();
        self.traffic.advance(self.game_speed);

        if let Some(car) = first_collision(&self.player.hitbox(), self.traffic.cars()) {
            let car_id = car.id;
            self.state = SessionState::GameOver;
            tracing::info!(
                "Crashed into car {} ({:?}) at score {}",
                car_id,
                car.behavior,
                self.score
            );
            return TickOutcome::Crashed {
                score: self.score,
                car_id,
            };
        }

        TickOutcome::Advanced
    }

    /// Spawn attempt from the traffic timer. Returns the new car's id.
    pub fn spawn_traffic<R: Rng>(&mut self, rng: &mut R) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        let spawned = self.traffic.try_spawn(rng).map(|car| car.id);
        if spawned.is_none() {
            tracing::trace!("Spawn skipped, no free lane");
        }
        spawned
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Pause ↔ resume. A finished session stays finished.
    pub fn toggle_pause(&mut self) -> SessionState {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            SessionState::GameOver => SessionState::GameOver,
        };
        tracing::info!("Session {:?}", self.state);
        self.state
    }

    /// Pick a difficulty from the pause menu.
    ///
    /// Overwrites the current game speed with the level's fixed value; later
    /// score steps keep adding on top of it. Ignored unless paused.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.state != SessionState::Paused {
            tracing::debug!("Difficulty change to {} ignored while {:?}", difficulty, self.state);
            return false;
        }
        self.difficulty = difficulty;
        self.game_speed = difficulty.game_speed();
        tracing::info!("Difficulty {} (game speed {:.1})", difficulty, self.game_speed);
        true
    }

    /// Start a new run. Difficulty and the persisted high score survive.
    pub fn reset(&mut self) {
        self.player.reset();
        self.traffic.clear();
        self.score = 0;
        self.game_speed = BASE_GAME_SPEED;
        self.state = SessionState::Running;
        self.ticks = 0;
        tracing::info!("Session reset");
    }

    pub fn snapshot(&self, high_score: u32) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            player: PlayerView {
                x: self.player.x,
                y: PLAYER_Y,
                speed: self.player.speed,
                max_speed: self.player.props.max_speed,
                steering_angle: self.player.steering_angle,
            },
            score: self.score,
            high_score,
            state: self.state,
            difficulty: self.difficulty,
            game_speed: self.game_speed,
            cars: self.traffic.cars().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::{Behavior, CarColor, CarSize, Lane};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> GameSession {
        GameSession::new(&Tuning::default())
    }

    /// A stationary sedan (50×70) centred at (x, y)
    fn parked_car(id: u64, x: f32, y: f32) -> AiCar {
        AiCar {
            id,
            lane: Lane::Center,
            x,
            y,
            speed: 0.0,
            size: CarSize::Sedan,
            color: CarColor::White,
            behavior: Behavior::Cautious,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn hundred_ticks_raise_game_speed_by_step() {
        let mut s = session();
        let start = s.game_speed();
        for _ in 0..99 {
            assert_eq!(s.tick(), TickOutcome::Advanced);
        }
        assert_eq!(s.game_speed(), start, "no increase before the 100th point");
        s.tick();
        assert_eq!(s.score(), 100);
        assert!(approx(s.game_speed(), start + GAME_SPEED_STEP), "got {}", s.game_speed());
    }

    #[test]
    fn score_and_speed_never_decrease_while_running() {
        let mut s = session();
        let (mut score, mut speed) = (s.score(), s.game_speed());
        for _ in 0..450 {
            s.tick();
            assert!(s.score() > score);
            assert!(s.game_speed() >= speed);
            score = s.score();
            speed = s.game_speed();
        }
        assert!(approx(s.game_speed(), 1.8), "got {}", s.game_speed());
    }

    #[test]
    fn score_and_tick_counter_saturate() {
        let mut s = session();
        s.score = u32::MAX - 1;
        s.ticks = u64::MAX;
        let speed = s.game_speed();

        assert_eq!(s.tick(), TickOutcome::Advanced);
        assert_eq!(s.tick(), TickOutcome::Advanced);
        assert_eq!(s.score(), u32::MAX);
        assert_eq!(s.ticks, u64::MAX);
        assert!(s.is_running());
        // u32::MAX is not a multiple of the step, so pinning there adds no speed
        assert!(approx(s.game_speed(), speed));
    }

    #[test]
    fn paused_session_does_not_advance() {
        let mut s = session();
        s.accelerate();
        s.tick();
        assert_eq!(s.toggle_pause(), SessionState::Paused);
        let before = s.clone().snapshot(0);
        for _ in 0..10 {
            assert_eq!(s.tick(), TickOutcome::Skipped);
        }
        assert_eq!(s.snapshot(0), before);
        assert!(!s.accelerate(), "input is ignored while paused");
        assert_eq!(s.toggle_pause(), SessionState::Running);
        assert_eq!(s.tick(), TickOutcome::Advanced);
    }

    #[test]
    fn accelerate_brake_scenario() {
        let mut s = session();
        for _ in 0..10 {
            s.accelerate();
        }
        assert_eq!(s.player().speed, 50.0);
        s.brake();
        assert_eq!(s.player().speed, 42.0);
    }

    #[test]
    fn overlap_ends_the_game() {
        let mut s = session();
        s.traffic.push_for_test(parked_car(7, 44.9, 445.5));
        assert_eq!(s.tick(), TickOutcome::Crashed { score: 1, car_id: 7 });
        assert_eq!(s.state(), SessionState::GameOver);
        // Further ticks are suppressed, the crash is reported once
        assert_eq!(s.tick(), TickOutcome::Skipped);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn boundary_distance_is_safe() {
        let mut s = session();
        // Player 40×40 at (0, 500); sedan half-sums are 45 wide, 55 tall
        s.traffic.push_for_test(parked_car(1, 45.0, 500.0));
        s.traffic.push_for_test(parked_car(2, 0.0, 445.0));
        s.traffic.push_for_test(parked_car(3, -45.0, 555.0));
        for _ in 0..5 {
            assert_eq!(s.tick(), TickOutcome::Advanced);
        }
        assert!(s.is_running());
    }

    #[test]
    fn moving_car_hits_on_the_tick_it_arrives() {
        let mut s = session();
        let mut car = parked_car(3, 0.0, 440.0);
        car.speed = 10.0;
        s.traffic.push_for_test(car);
        // After one tick the car is at y=450: gap 50 < 55 → crash
        assert!(matches!(s.tick(), TickOutcome::Crashed { car_id: 3, .. }));
    }

    #[test]
    fn reset_from_game_over_clears_everything() {
        let mut s = session();
        for _ in 0..250 {
            s.accelerate();
            s.steer(30.0);
            s.tick();
        }
        s.spawn_traffic(&mut StdRng::seed_from_u64(1));
        s.traffic.push_for_test(parked_car(99, s.player().x, 500.0));
        assert!(matches!(s.tick(), TickOutcome::Crashed { .. }));

        s.reset();
        assert_eq!(s.score(), 0);
        assert_eq!(s.game_speed(), 1.0);
        assert!(s.cars().is_empty());
        assert_eq!(s.player().x, 0.0);
        assert_eq!(s.player().speed, 0.0);
        assert_eq!(s.player().steering_angle, 0.0);
        assert_eq!(s.state(), SessionState::Running);

        // Reset twice in a row gives the same result
        let first = s.snapshot(0);
        s.reset();
        assert_eq!(s.snapshot(0), first);
    }

    #[test]
    fn reset_restores_base_speed_even_on_hard() {
        let mut s = GameSession::with_difficulty(&Tuning::default(), Difficulty::Hard);
        assert_eq!(s.game_speed(), 1.2);
        s.reset();
        assert_eq!(s.game_speed(), BASE_GAME_SPEED);
        assert_eq!(s.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_only_changes_while_paused() {
        let mut s = session();
        assert!(!s.set_difficulty(Difficulty::Hard));
        assert_eq!(s.difficulty(), Difficulty::Normal);
        s.toggle_pause();
        assert!(s.set_difficulty(Difficulty::Hard));
        assert_eq!(s.difficulty(), Difficulty::Hard);
        assert_eq!(s.game_speed(), 1.2);
    }

    #[test]
    fn difficulty_overwrites_then_score_accumulates() {
        let mut s = session();
        for _ in 0..200 {
            s.tick();
        }
        assert!(approx(s.game_speed(), 1.4));

        s.toggle_pause();
        s.set_difficulty(Difficulty::Easy);
        assert_eq!(s.game_speed(), 0.8, "selection overwrites accumulated speed");
        s.toggle_pause();

        for _ in 0..100 {
            s.tick();
        }
        assert!(approx(s.game_speed(), 1.0), "got {}", s.game_speed());
    }

    #[test]
    fn no_spawns_after_game_over() {
        let mut s = session();
        s.traffic.push_for_test(parked_car(0, 0.0, 500.0));
        s.tick();
        assert_eq!(s.state(), SessionState::GameOver);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(s.spawn_traffic(&mut rng), None);
        assert_eq!(s.cars().len(), 1);
    }

    #[test]
    fn pause_does_not_leave_game_over() {
        let mut s = session();
        s.traffic.push_for_test(parked_car(0, 0.0, 500.0));
        s.tick();
        assert_eq!(s.toggle_pause(), SessionState::GameOver);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = session();
        s.accelerate();
        s.spawn_traffic(&mut StdRng::seed_from_u64(3));
        s.tick();
        let snap = s.snapshot(40);
        assert_eq!(snap.score, 1);
        assert_eq!(snap.high_score, 40);
        assert_eq!(snap.player.speed, 3.0);
        assert_eq!(snap.player.y, PLAYER_Y);
        assert_eq!(snap.cars.len(), 1);
        assert!(!snap.paused());
        assert!(!snap.game_over());
    }
}
