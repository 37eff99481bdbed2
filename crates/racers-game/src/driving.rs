//! Player car physics
//!
//! Deliberately simple, linear and clamped:
//!   - accelerate / brake add or remove a fixed amount of speed
//!   - steering sets an angle and slides the car sideways proportionally to
//!     that angle and to the current speed
//!   - every tick the car loses a fixed amount of speed and the steering
//!     wheel recentres by a constant factor
//!
//! Lateral position is measured from the track centre; the car's vertical
//! position on screen never changes.

use racers_common::Tuning;

use crate::collision::Hitbox;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Steering lock in degrees (both directions)
pub const MAX_STEERING_ANGLE: f32 = 45.0;
/// Lateral travel limit from the track centre (both directions)
pub const LATERAL_LIMIT: f32 = 200.0;
/// Sideways jump of a single left/right nudge
pub const NUDGE_STEP: f32 = 20.0;
/// Degrees of steering per pixel of horizontal drag on the wheel
pub const DRAG_STEER_FACTOR: f32 = 0.5;
/// Fixed vertical position of the player's hit-box centre
pub const PLAYER_Y: f32 = 500.0;
/// Player hit-box size
pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 40.0;
/// Steering angles below this magnitude snap to zero while recentring
const STEERING_EPSILON: f32 = 0.001;

// ---------------------------------------------------------------------------
// Drive properties
// ---------------------------------------------------------------------------

/// Per-input and per-tick rates, taken from the tuning table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveProperties {
    pub acceleration: f32,
    pub brake_force: f32,
    pub max_speed: f32,
    pub steering_rate: f32,
    pub natural_deceleration: f32,
    pub steering_return: f32,
}

impl DriveProperties {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            acceleration: tuning.acceleration_rate,
            brake_force: tuning.brake_rate,
            max_speed: tuning.max_speed,
            steering_rate: tuning.steering_rate,
            natural_deceleration: tuning.natural_deceleration,
            steering_return: tuning.steering_return,
        }
    }
}

impl Default for DriveProperties {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

// ---------------------------------------------------------------------------
// PlayerCar
// ---------------------------------------------------------------------------

/// The player's car
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCar {
    /// Lateral position, [-LATERAL_LIMIT, LATERAL_LIMIT]
    pub x: f32,
    /// Forward speed, [0, max_speed]
    pub speed: f32,
    /// Steering angle in degrees, [-MAX_STEERING_ANGLE, MAX_STEERING_ANGLE]
    pub steering_angle: f32,
    pub props: DriveProperties,
}

impl PlayerCar {
    pub fn new(props: DriveProperties) -> Self {
        Self {
            x: 0.0,
            speed: 0.0,
            steering_angle: 0.0,
            props,
        }
    }

    /// Back to the starting grid: centred, stationary, wheel straight
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.speed = 0.0;
        self.steering_angle = 0.0;
    }

    pub fn accelerate(&mut self) {
        self.speed = (self.speed + self.props.acceleration).min(self.props.max_speed);
    }

    pub fn brake(&mut self) {
        self.speed = (self.speed - self.props.brake_force).max(0.0);
    }

    /// Turn the wheel to `target_angle` and slide sideways accordingly
    pub fn steer(&mut self, target_angle: f32) {
        if target_angle.is_nan() {
            return;
        }
        self.steering_angle = target_angle.clamp(-MAX_STEERING_ANGLE, MAX_STEERING_ANGLE);
        let lateral = (self.steering_angle / MAX_STEERING_ANGLE)
            * self.props.steering_rate
            * self.speed_fraction();
        self.x = (self.x + lateral).clamp(-LATERAL_LIMIT, LATERAL_LIMIT);
    }

    /// Turn the wheel relative to its current angle (horizontal drag)
    pub fn steer_by_drag(&mut self, drag_dx: f32) {
        self.steer(self.steering_angle + drag_dx * DRAG_STEER_FACTOR);
    }

    pub fn nudge_left(&mut self) {
        self.x = (self.x - NUDGE_STEP).max(-LATERAL_LIMIT);
    }

    pub fn nudge_right(&mut self) {
        self.x = (self.x + NUDGE_STEP).min(LATERAL_LIMIT);
    }

    /// Per-tick decay: friction on speed, self-centering on the wheel
    pub fn update(&mut self) {
        if self.speed > 0.0 {
            self.speed = (self.speed - self.props.natural_deceleration).max(0.0);
        }

        self.steering_angle *= self.props.steering_return;
        if self.steering_angle.abs() < STEERING_EPSILON {
            self.steering_angle = 0.0;
        }
    }

    /// Speed as a fraction of top speed (0.0 - 1.0)
    pub fn speed_fraction(&self) -> f32 {
        if self.props.max_speed > 0.0 {
            (self.speed / self.props.max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.x, PLAYER_Y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> PlayerCar {
        PlayerCar::new(DriveProperties::default())
    }

    #[test]
    fn accelerate_then_brake() {
        let mut car = car();
        for _ in 0..10 {
            car.accelerate();
        }
        assert_eq!(car.speed, 50.0);
        car.brake();
        assert_eq!(car.speed, 42.0);
    }

    #[test]
    fn speed_stays_within_bounds() {
        let mut car = car();
        for _ in 0..200 {
            car.accelerate();
            assert!(car.speed <= car.props.max_speed);
        }
        assert_eq!(car.speed, 300.0);
        for _ in 0..200 {
            car.brake();
            assert!(car.speed >= 0.0);
        }
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn steering_angle_is_clamped() {
        let mut car = car();
        for angle in [-1000.0, -45.0, -12.5, 0.0, 30.0, 45.0, 9000.0, f32::INFINITY] {
            car.steer(angle);
            assert!(
                (-MAX_STEERING_ANGLE..=MAX_STEERING_ANGLE).contains(&car.steering_angle),
                "angle {} → {}",
                angle,
                car.steering_angle
            );
        }
    }

    #[test]
    fn steering_without_speed_does_not_move() {
        let mut car = car();
        car.steer(45.0);
        assert_eq!(car.x, 0.0);
    }

    #[test]
    fn steering_moves_proportionally_to_speed() {
        let mut car = car();
        car.speed = 150.0;
        car.steer(45.0);
        // (45/45) * 3 * (150/300)
        assert!((car.x - 1.5).abs() < 1e-5, "x = {}", car.x);
        car.steer(-22.5);
        assert!((car.x - 0.75).abs() < 1e-5, "x = {}", car.x);
    }

    #[test]
    fn lateral_position_is_clamped() {
        let mut car = car();
        car.speed = car.props.max_speed;
        for _ in 0..500 {
            car.steer(45.0);
            assert!(car.x <= LATERAL_LIMIT);
        }
        assert_eq!(car.x, LATERAL_LIMIT);
        for _ in 0..1000 {
            car.steer(-45.0);
            assert!(car.x >= -LATERAL_LIMIT);
        }
        assert_eq!(car.x, -LATERAL_LIMIT);
    }

    #[test]
    fn nudges_are_clamped() {
        let mut car = car();
        for _ in 0..20 {
            car.nudge_right();
        }
        assert_eq!(car.x, LATERAL_LIMIT);
        for _ in 0..40 {
            car.nudge_left();
        }
        assert_eq!(car.x, -LATERAL_LIMIT);
    }

    #[test]
    fn drag_steers_relative_to_current_angle() {
        let mut car = car();
        car.steer_by_drag(20.0);
        assert_eq!(car.steering_angle, 10.0);
        car.steer_by_drag(20.0);
        assert_eq!(car.steering_angle, 20.0);
        car.steer_by_drag(-200.0);
        assert_eq!(car.steering_angle, -45.0);
    }

    #[test]
    fn natural_decay_reaches_zero_and_stays() {
        let mut car = car();
        car.speed = 37.0;
        let mut previous = car.speed;
        while car.speed > 0.0 {
            car.update();
            assert!(car.speed < previous, "speed must strictly decrease");
            previous = car.speed;
        }
        for _ in 0..10 {
            car.update();
            assert_eq!(car.speed, 0.0);
        }
    }

    #[test]
    fn steering_recentres() {
        let mut car = car();
        car.steer(40.0);
        car.update();
        assert!((car.steering_angle - 38.0).abs() < 1e-4);
        for _ in 0..1000 {
            car.update();
        }
        assert_eq!(car.steering_angle, 0.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut car = car();
        car.speed = 120.0;
        car.steer(30.0);
        car.nudge_left();
        car.reset();
        assert_eq!(car.x, 0.0);
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.steering_angle, 0.0);
        // Decay on a freshly reset car changes nothing
        car.update();
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.steering_angle, 0.0);
    }
}
