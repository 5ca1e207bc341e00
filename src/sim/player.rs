//! Player avatar
//!
//! Movement input lives in the host; the simulation only needs where the
//! player stands and where it aims.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::PlayerContact;
use crate::consts::PLAYER_RADIUS;
use crate::normalize_degrees;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    /// Aim angle in degrees (0 = +X, counter-clockwise)
    pub aim: f32,
    pub radius: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            aim: 0.0,
            radius: PLAYER_RADIUS,
        }
    }
}

impl Player {
    /// Unit vector along the aim angle
    pub fn aim_direction(&self) -> Vec2 {
        Vec2::from_angle(self.aim.to_radians())
    }

    /// Aim at a world point. Leaves the aim alone if the point is the player's own position.
    pub fn face_towards(&mut self, target: Vec2) {
        let delta = target - self.position;
        if delta.length_squared() > f32::EPSILON {
            self.aim = normalize_degrees(delta.y.atan2(delta.x).to_degrees());
        }
    }

    pub fn contact(&self) -> PlayerContact {
        PlayerContact {
            position: self.position,
        }
    }
}
