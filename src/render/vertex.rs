//! Vertex and instance layouts handed to the host renderer

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 2D mesh vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl MeshVertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn from_point(point: Vec2, color: [f32; 4]) -> Self {
        Self::new(point.x, point.y, color)
    }
}

/// One textured quad: a projectile or the player
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
    pub texture_id: u32,
    /// 0 = hidden (inactive pool slot), 1 = drawn
    pub visible: u32,
    _pad: [u32; 2], // Pad to 32 bytes
}

impl SpriteInstance {
    pub fn new(position: Vec2, rotation: f32, scale: f32, texture_id: u32, visible: bool) -> Self {
        Self {
            position: position.to_array(),
            rotation,
            scale,
            texture_id,
            visible: visible as u32,
            _pad: [0; 2],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible != 0
    }
}

/// Colors for arena elements
pub mod colors {
    pub const WALL: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
}
