//! Scene configuration
//!
//! JSON description of an arena: wall layout, player placement and
//! projectile tuning. Every field is optional and falls back to defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    ARENA_BOUNDS_RADIUS, PLAYER_RADIUS, WALL_ANGLE, WALL_RADIUS, WALL_ROTATION_SPEED,
    WALL_SMOOTHNESS, WALL_THICKNESS,
};
use crate::sim::behavior::ProjectileTuning;
use crate::sim::wall::WallKind;

/// One arc wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    pub radius: f32,
    pub thickness: f32,
    /// Sweep in degrees
    pub angle: f32,
    pub smoothness: u32,
    /// Degrees per second toward the target rotation
    pub rotation_speed: f32,
    pub kind: WallKind,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            radius: WALL_RADIUS,
            thickness: WALL_THICKNESS,
            angle: WALL_ANGLE,
            smoothness: WALL_SMOOTHNESS,
            rotation_speed: WALL_ROTATION_SPEED,
            kind: WallKind::Static,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub position: Vec2,
    /// Degrees
    pub aim: f32,
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            aim: 0.0,
            radius: PLAYER_RADIUS,
        }
    }
}

/// Full scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub walls: Vec<WallConfig>,
    pub player: PlayerConfig,
    pub projectiles: ProjectileTuning,
    /// Inactive projectile slots allocated up front
    pub prewarm: usize,
    /// Projectiles farther than this from the origin are out of bounds
    pub bounds_radius: f32,
}

impl Default for ArenaConfig {
    /// Four quarter arcs ringing the origin, facing outward
    fn default() -> Self {
        let walls = [0.0f32, 90.0, 180.0, 270.0]
            .into_iter()
            .map(|rotation| WallConfig {
                position: Vec2::ZERO,
                rotation,
                radius: 8.0,
                thickness: WALL_THICKNESS,
                angle: 60.0,
                ..Default::default()
            })
            .collect();

        Self {
            walls,
            player: PlayerConfig::default(),
            projectiles: ProjectileTuning::default(),
            prewarm: 32,
            bounds_radius: ARENA_BOUNDS_RADIUS,
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid arena config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check projectile tuning and arena bounds. Wall geometry is checked at rebuild.
    pub fn validate(&self) -> Result<()> {
        if let Err((kind, err)) = self.projectiles.validate() {
            return Err(err).with_context(|| format!("invalid {} tuning", kind.as_str()));
        }
        if !(self.bounds_radius > 0.0) {
            anyhow::bail!("bounds_radius must be positive (got {})", self.bounds_radius);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize arena config")
    }

    /// Read a config file, failing on I/O or parse errors
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Read a config file, falling back to defaults when it is missing or broken
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(config) => {
                log::info!("Loaded arena config from {}", path.display());
                config
            }
            Err(err) if !path.exists() => {
                log::info!("No arena config at {} ({err}), using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Using default arena config: {err:#}");
                Self::default()
            }
        }
    }
}
