//! Arc Arena - a small 2D arena shooter core
//!
//! Core modules:
//! - `sim`: Simulation (arc wall geometry, projectile pool, behaviours, collisions)
//! - `render`: Host-facing render snapshots (wall meshes, sprite instances)
//! - `config`: Data-driven scene and projectile tuning

pub mod config;
pub mod render;
pub mod sim;

pub use config::ArenaConfig;
pub use sim::{Arena, ProjectileHandle, ProjectileKind, ProjectilePool};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Wall defaults (world units / degrees)
    pub const WALL_RADIUS: f32 = 2.0;
    pub const WALL_THICKNESS: f32 = 0.5;
    pub const WALL_ANGLE: f32 = 90.0;
    pub const WALL_SMOOTHNESS: u32 = 16;
    /// Degrees per second a wall turns toward its target rotation
    pub const WALL_ROTATION_SPEED: f32 = 180.0;
    /// Thickness an eroding wall never wears below
    pub const WALL_MIN_THICKNESS: f32 = 0.05;
    /// Thickness an eroding wall loses per projectile hit
    pub const WALL_EROSION_PER_HIT: f32 = 0.05;

    /// Subdivision bounds for generated arcs
    pub const MIN_SUBDIVISIONS: u32 = 3;
    pub const MAX_SUBDIVISIONS: u32 = 64;

    /// Two ring points closer than this (squared) are merged
    pub const DEDUP_EPSILON_SQ: f32 = 1e-6;

    /// Collider radius of a projectile at size 1.0
    pub const PROJECTILE_BASE_RADIUS: f32 = 0.5;
    /// Player collider radius
    pub const PLAYER_RADIUS: f32 = 0.5;
    /// Projectiles past this distance from the origin hit the arena boundary
    pub const ARENA_BOUNDS_RADIUS: f32 = 50.0;
}

/// Normalized angle in degrees to [-180, 180). Non-finite input maps to 0.
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + 180.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360
    if wrapped >= 360.0 { -180.0 } else { wrapped - 180.0 }
}

/// Convert polar (r, theta in radians) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Rotate a local-space point by `degrees` and translate it by `origin`
#[inline]
pub fn local_to_world(point: Vec2, origin: Vec2, degrees: f32) -> Vec2 {
    origin + Vec2::from_angle(degrees.to_radians()).rotate(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(190.0) - (-170.0)).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((normalize_degrees(180.0) - (-180.0)).abs() < 1e-4);
        assert!((normalize_degrees(45.0) - 45.0).abs() < 1e-4);
        assert_eq!(normalize_degrees(-900.0), -180.0);
    }

    #[test]
    fn test_normalize_degrees_extreme_input() {
        for angle in [1.0e10, -1.0e10, f32::MAX, f32::MIN, -1.0e-7] {
            let n = normalize_degrees(angle);
            assert!((-180.0..180.0).contains(&n), "{angle} -> {n}");
        }
        assert_eq!(normalize_degrees(f32::INFINITY), 0.0);
        assert_eq!(normalize_degrees(f32::NEG_INFINITY), 0.0);
        assert_eq!(normalize_degrees(f32::NAN), 0.0);
    }

    #[test]
    fn test_local_to_world() {
        let p = local_to_world(Vec2::new(1.0, 0.0), Vec2::new(3.0, 4.0), 90.0);
        assert!((p - Vec2::new(3.0, 5.0)).length() < 1e-5);
    }
}
