//! AI traffic
//!
//! Cars enter at the top of the track in one of three lanes and drive down
//! towards (and past) the player:
//!   - a spawn attempt skips lanes whose latest car is still close to the
//!     spawn line, so cars never stack on top of each other
//!   - behaviour decides the speed range (and the indicator colour on screen)
//!   - every tick each car moves down by `speed * game_speed`
//!   - cars past the far boundary are dropped from the list

use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::Range;

use crate::collision::Hitbox;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Vertical position new cars appear at (above the visible track)
pub const SPAWN_Y: f32 = -100.0;
/// A lane stays blocked while its latest car is closer than this to `SPAWN_Y`
pub const NEAR_SPAWN_DISTANCE: f32 = 150.0;
/// Cars whose centre passes this line have left the track and are removed
pub const DESPAWN_Y: f32 = 800.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One of the three traffic lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Lane index as used on the track (-1, 0, 1)
    pub fn index(&self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    /// Lateral centre of the lane
    pub fn x(&self) -> f32 {
        self.index() as f32 * 100.0
    }

    fn slot(&self) -> usize {
        (self.index() + 1) as usize
    }
}

/// Driving style of an AI car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    /// Fast and unpredictable
    Aggressive,
    Normal,
    /// Slow and steady
    Cautious,
}

impl Behavior {
    pub const ALL: [Behavior; 3] = [Behavior::Aggressive, Behavior::Normal, Behavior::Cautious];

    /// Speed range (track units per tick) sampled at spawn
    pub fn speed_range(&self) -> Range<f32> {
        match self {
            Behavior::Aggressive => 4.0..7.0,
            Behavior::Normal => 3.0..5.0,
            Behavior::Cautious => 2.0..4.0,
        }
    }
}

/// Body colour of an AI car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarColor {
    Yellow,
    Magenta,
    Cyan,
    White,
}

impl CarColor {
    pub const ALL: [CarColor; 4] = [CarColor::Yellow, CarColor::Magenta, CarColor::Cyan, CarColor::White];
}

/// Body size preset of an AI car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarSize {
    Sports,
    Sedan,
    Truck,
}

impl CarSize {
    pub const ALL: [CarSize; 3] = [CarSize::Sports, CarSize::Sedan, CarSize::Truck];

    /// (width, height)
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            CarSize::Sports => (40.0, 60.0),
            CarSize::Sedan => (50.0, 70.0),
            CarSize::Truck => (60.0, 90.0),
        }
    }
}

/// An AI-controlled car on the track
#[derive(Debug, Clone, PartialEq)]
pub struct AiCar {
    pub id: u64,
    pub lane: Lane,
    /// Lateral centre
    pub x: f32,
    /// Vertical centre; grows as the car drives down the screen
    pub y: f32,
    /// Units per tick before the game-speed multiplier
    pub speed: f32,
    pub size: CarSize,
    pub color: CarColor,
    pub behavior: Behavior,
}

impl AiCar {
    pub fn hitbox(&self) -> Hitbox {
        let (width, height) = self.size.dimensions();
        Hitbox::new(self.x, self.y, width, height)
    }

    /// Still close enough to the spawn line to block its lane
    pub fn near_spawn(&self) -> bool {
        self.y - SPAWN_Y < NEAR_SPAWN_DISTANCE
    }

    pub fn advance(&mut self, game_speed: f32) {
        self.y += self.speed * game_speed;
    }

    pub fn off_track(&self) -> bool {
        self.y > DESPAWN_Y
    }
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

/// All live AI cars plus the per-lane spawn bookkeeping
#[derive(Debug, Clone, Default)]
pub struct Traffic {
    cars: Vec<AiCar>,
    next_id: u64,
    /// Id of the most recently spawned car per lane (index = lane slot)
    last_spawned: [Option<u64>; 3],
}

impl Traffic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cars(&self) -> &[AiCar] {
        &self.cars
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Lanes a new car may enter right now
    pub fn free_lanes(&self) -> Vec<Lane> {
        Lane::ALL
            .iter()
            .copied()
            .filter(|lane| {
                let latest = self.last_spawned[lane.slot()]
                    .and_then(|id| self.cars.iter().find(|c| c.id == id));
                !latest.is_some_and(AiCar::near_spawn)
            })
            .collect()
    }

    /// Try to put a new car on the track.
    ///
    /// Returns the new car, or `None` when every lane is still blocked.
    pub fn try_spawn<R: Rng>(&mut self, rng: &mut R) -> Option<&AiCar> {
        let free = self.free_lanes();
        let lane = *free.choose(rng)?;
        let behavior = *Behavior::ALL.choose(rng)?;
        let speed = rng.gen_range(behavior.speed_range());
        let size = *CarSize::ALL.choose(rng)?;
        let color = *CarColor::ALL.choose(rng)?;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.last_spawned[lane.slot()] = Some(id);

        tracing::debug!(
            "Spawned car {} in {:?} lane ({:?}, {:.2} u/tick, {:?})",
            id,
            lane,
            behavior,
            speed,
            size
        );

        self.cars.push(AiCar {
            id,
            lane,
            x: lane.x(),
            y: SPAWN_Y,
            speed,
            size,
            color,
            behavior,
        });
        self.cars.last()
    }

    /// Move every car one tick and drop the ones that left the track.
    /// Returns how many were removed.
    pub fn advance(&mut self, game_speed: f32) -> usize {
        for car in &mut self.cars {
            car.advance(game_speed);
        }

        let before = self.cars.len();
        self.cars.retain(|car| !car.off_track());
        let removed = before - self.cars.len();
        if removed > 0 {
            tracing::trace!("Despawned {} car(s), {} on track", removed, self.cars.len());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.cars.clear();
        self.last_spawned = [None; 3];
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, car: AiCar) {
        self.last_spawned[car.lane.slot()] = Some(car.id);
        self.next_id = self.next_id.max(car.id + 1);
        self.cars.push(car);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
