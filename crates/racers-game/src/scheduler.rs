//! Fixed-step timers driven by the frame loop
//!
//! Two independent timers:
//!   - tick timer  — fires every `tick_interval` (16 ms by default)
//!   - spawn timer — fires after a random 2–4 s delay, re-drawn each time
//!
//! The frame loop hands in wall-clock time with `advance`; the scheduler
//! answers how many of each are due. Nothing here touches game state, so the
//! caller decides ordering (spawns first, then ticks).
//!
//! Each timer carries a `CancelToken`. Once cancelled a timer never fires
//! again until `rearm` hands out fresh tokens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use racers_common::Tuning;

/// Shared stop flag for one timer
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub spawn_min: Duration,
    pub spawn_max: Duration,
    /// Upper bound on ticks run in one frame after a stall
    pub max_catch_up: u32,
}

impl SchedulerConfig {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            tick_interval: Duration::from_millis(tuning.tick_interval_ms),
            spawn_min: Duration::from_millis(tuning.spawn_interval_min_ms),
            spawn_max: Duration::from_millis(tuning.spawn_interval_max_ms),
            max_catch_up: tuning.max_catch_up_ticks,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Work due after one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub spawns: u32,
    pub ticks: u32,
}

#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    tick_elapsed: Duration,
    spawn_elapsed: Duration,
    spawn_delay: Duration,
    tick_token: CancelToken,
    spawn_token: CancelToken,
}

impl Scheduler {
    pub fn new<R: Rng>(config: SchedulerConfig, rng: &mut R) -> Self {
        let spawn_delay = draw_spawn_delay(&config, rng);
        tracing::debug!(
            "Scheduler armed: tick every {:?}, first spawn in {:?}",
            config.tick_interval,
            spawn_delay
        );
        Self {
            config,
            tick_elapsed: Duration::ZERO,
            spawn_elapsed: Duration::ZERO,
            spawn_delay,
            tick_token: CancelToken::new(),
            spawn_token: CancelToken::new(),
        }
    }

    pub fn tick_token(&self) -> CancelToken {
        self.tick_token.clone()
    }

    pub fn spawn_token(&self) -> CancelToken {
        self.spawn_token.clone()
    }

    /// Delay the spawn timer is currently waiting for
    pub fn spawn_delay(&self) -> Duration {
        self.spawn_delay
    }

    /// Feed wall-clock time. While `active` is false (paused, game over)
    /// time is discarded rather than banked.
    pub fn advance<R: Rng>(&mut self, elapsed: Duration, active: bool, rng: &mut R) -> Due {
        if !active {
            return Due::default();
        }
        Due {
            spawns: self.advance_spawn(elapsed, rng),
            ticks: self.advance_tick(elapsed),
        }
    }

    fn advance_tick(&mut self, elapsed: Duration) -> u32 {
        if self.tick_token.is_cancelled() || self.config.tick_interval.is_zero() {
            return 0;
        }
        self.tick_elapsed += elapsed;

        let interval = self.config.tick_interval;
        let due = self.tick_elapsed.as_nanos() / interval.as_nanos();
        self.tick_elapsed -= interval * due as u32;

        let capped = due.min(u128::from(self.config.max_catch_up)) as u32;
        if u128::from(capped) < due {
            tracing::debug!("Frame stall: dropped {} tick(s)", due - u128::from(capped));
        }
        capped
    }

    fn advance_spawn<R: Rng>(&mut self, elapsed: Duration, rng: &mut R) -> u32 {
        if self.spawn_token.is_cancelled() {
            return 0;
        }
        self.spawn_elapsed += elapsed;

        let mut spawns = 0;
        while self.spawn_elapsed >= self.spawn_delay {
            self.spawn_elapsed -= self.spawn_delay;
            self.spawn_delay = draw_spawn_delay(&self.config, rng);
            spawns += 1;
            if spawns >= self.config.max_catch_up.max(1) {
                self.spawn_elapsed = Duration::ZERO;
                break;
            }
        }
        spawns
    }

    /// Stop both timers
    pub fn cancel(&self) {
        self.tick_token.cancel();
        self.spawn_token.cancel();
        tracing::debug!("Scheduler cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.tick_token.is_cancelled() && self.spawn_token.is_cancelled()
    }

    /// Fresh tokens, empty accumulators and a new spawn delay
    pub fn rearm<R: Rng>(&mut self, rng: &mut R) {
        self.tick_token.cancel();
        self.spawn_token.cancel();
        self.tick_token = CancelToken::new();
        self.spawn_token = CancelToken::new();
        self.tick_elapsed = Duration::ZERO;
        self.spawn_elapsed = Duration::ZERO;
        self.spawn_delay = draw_spawn_delay(&self.config, rng);
        tracing::debug!("Scheduler re-armed, first spawn in {:?}", self.spawn_delay);
    }
}

fn draw_spawn_delay<R: Rng>(config: &SchedulerConfig, rng: &mut R) -> Duration {
    if config.spawn_max <= config.spawn_min {
        return config.spawn_min;
    }
    let min = config.spawn_min.as_millis() as u64;
    let max = config.spawn_max.as_millis() as u64;
    Duration::from_millis(rng.gen_range(min..=max))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(16);

    fn scheduler(rng: &mut StdRng) -> Scheduler {
        Scheduler::new(SchedulerConfig::default(), rng)
    }

    #[test]
    fn one_tick_per_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = scheduler(&mut rng);
        assert_eq!(s.advance(Duration::from_millis(15), true, &mut rng).ticks, 0);
        assert_eq!(s.advance(Duration::from_millis(1), true, &mut rng).ticks, 1);
        assert_eq!(s.advance(Duration::from_millis(48), true, &mut rng).ticks, 3);
    }

    #[test]
    fn remainder_carries_between_frames() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut s = scheduler(&mut rng);
        let total: u32 = (0..10)
            .map(|_| s.advance(Duration::from_millis(10), true, &mut rng).ticks)
            .sum();
        // 100 ms at 16 ms per tick
        assert_eq!(total, 6);
    }

    #[test]
    fn stall_is_capped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = scheduler(&mut rng);
        let due = s.advance(Duration::from_secs(1), true, &mut rng);
        assert_eq!(due.ticks, SchedulerConfig::default().max_catch_up);
        // The dropped backlog is not replayed next frame
        assert!(s.advance(FRAME, true, &mut rng).ticks <= 1);
    }

    #[test]
    fn spawn_delay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let config = SchedulerConfig::default();
        for _ in 0..200 {
            let d = draw_spawn_delay(&config, &mut rng);
            assert!(d >= Duration::from_millis(2000) && d <= Duration::from_millis(4000), "{:?}", d);
        }
    }

    #[test]
    fn spawn_fires_after_its_delay() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = scheduler(&mut rng);
        let delay = s.spawn_delay();

        let mut waited = Duration::ZERO;
        let mut spawns = 0;
        while waited + FRAME < delay {
            spawns += s.advance(FRAME, true, &mut rng).spawns;
            waited += FRAME;
        }
        assert_eq!(spawns, 0, "no spawn before {:?}", delay);

        spawns += s.advance(FRAME, true, &mut rng).spawns;
        assert_eq!(spawns, 1);
    }

    #[test]
    fn inactive_time_is_discarded() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut s = scheduler(&mut rng);
        assert_eq!(s.advance(Duration::from_secs(10), false, &mut rng), Due::default());
        assert_eq!(s.advance(Duration::from_millis(10), true, &mut rng), Due::default());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = scheduler(&mut rng);
        s.cancel();
        assert!(s.is_cancelled());
        for _ in 0..500 {
            assert_eq!(s.advance(FRAME, true, &mut rng), Due::default());
        }
    }

    #[test]
    fn external_token_stops_only_its_timer() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut s = scheduler(&mut rng);
        s.spawn_token().cancel();
        let due = s.advance(Duration::from_secs(5), true, &mut rng);
        assert_eq!(due.spawns, 0);
        assert!(due.ticks > 0);
    }

    #[test]
    fn rearm_restores_firing() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = scheduler(&mut rng);
        let old = s.tick_token();
        s.rearm(&mut rng);
        assert!(old.is_cancelled(), "re-arming retires the previous token");
        assert!(!s.is_cancelled());
        assert_eq!(s.advance(FRAME, true, &mut rng).ticks, 1);
    }
}
