//! Host-facing render snapshots
//!
//! The simulation does not draw. Each frame the host takes a `RenderFrame`
//! and uploads wall meshes and sprite instances however it likes.

pub mod vertex;

pub use vertex::{MeshVertex, SpriteInstance, colors};

use glam::Vec2;

use crate::sim::Arena;
use crate::sim::wall::{Wall, WallId};

/// Texture slot used for the player sprite
pub const PLAYER_TEXTURE: u32 = 0;

/// A wall mesh in local space plus the transform that places it
#[derive(Debug, Clone, PartialEq)]
pub struct WallDraw {
    pub id: WallId,
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl WallDraw {
    /// `None` while the wall has no valid mesh
    pub fn from_wall(wall: &Wall) -> Option<Self> {
        let body = wall.body();
        let mesh = body.mesh()?;
        Some(Self {
            id: body.id(),
            position: body.position,
            rotation: body.rotation,
            vertices: mesh
                .vertices
                .iter()
                .map(|&p| MeshVertex::from_point(p, colors::WALL))
                .collect(),
            indices: mesh.indices.clone(),
        })
    }
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    /// Visible walls only
    pub walls: Vec<WallDraw>,
    /// Player first, then one instance per pool slot (inactive slots hidden)
    pub sprites: Vec<SpriteInstance>,
}

impl RenderFrame {
    pub fn capture(arena: &Arena) -> Self {
        let walls = arena.walls().iter().filter_map(WallDraw::from_wall).collect();

        let player = &arena.player;
        let mut sprites = Vec::with_capacity(arena.pool().capacity() + 1);
        sprites.push(SpriteInstance::new(
            player.position,
            player.aim,
            player.radius * 2.0,
            PLAYER_TEXTURE,
            true,
        ));
        sprites.extend(arena.pool().slots().map(|(_, active, projectile)| {
            let body = projectile.body();
            SpriteInstance::new(
                body.position,
                body.heading(),
                body.size,
                projectile.behavior().stats().texture_id as u32,
                active,
            )
        }));

        Self { walls, sprites }
    }

    /// Sprites that should actually be drawn
    pub fn visible_sprites(&self) -> impl Iterator<Item = &SpriteInstance> {
        self.sprites.iter().filter(|s| s.is_visible())
    }
}
