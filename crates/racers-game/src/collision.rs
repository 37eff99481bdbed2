//! Axis-aligned hit-box collision
//!
//! Hit-boxes are centre + size. Two boxes overlap when the gap between their
//! centres is strictly smaller than half the summed extent on BOTH axes, so
//! boxes that merely touch do not collide.

use crate::traffic::AiCar;

/// Centre-anchored rectangle in track coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub fn new(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self { cx, cy, width, height }
    }

    pub fn overlaps(&self, other: &Hitbox) -> bool {
        (self.cx - other.cx).abs() < (self.width + other.width) / 2.0
            && (self.cy - other.cy).abs() < (self.height + other.height) / 2.0
    }
}

/// First AI car whose hit-box overlaps the player's, in spawn order
pub fn first_collision<'a>(player: &Hitbox, cars: &'a [AiCar]) -> Option<&'a AiCar> {
    cars.iter().find(|car| player.overlaps(&car.hitbox()))
}
