//! Collision events and reference contact detection
//!
//! A physics host reports pairs of touching bodies as `CollisionEvent`s. Each
//! side is resolved into a `CollisionOther` snapshot before any behaviour runs,
//! so both bodies react to the state the pair had when contact began.
//!
//! Hosts without a physics engine can use the circle/polygon overlap tests and the
//! `ContactTracker` below, which turns per-frame overlap into begin events.

use std::collections::BTreeSet;

use glam::Vec2;

use super::behavior::ProjectileKind;
use super::pool::ProjectileHandle;
use super::wall::WallId;

/// A body taking part in a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collider {
    Player,
    Wall(WallId),
    Projectile(ProjectileHandle),
    /// Anything the simulation has no entity for (arena bounds, scenery)
    Unknown,
}

/// Two bodies that started touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Collider,
    pub b: Collider,
}

impl CollisionEvent {
    pub fn new(a: Collider, b: Collider) -> Self {
        Self { a, b }
    }
}

/// Player state as seen by whatever it hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerContact {
    pub position: Vec2,
}

/// Wall state as seen by whatever it hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub id: WallId,
    /// Arc centre in world space
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
}

/// Projectile state as seen by whatever it hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileContact {
    pub handle: ProjectileHandle,
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
}

/// The other side of a collision, resolved to a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOther {
    Player(PlayerContact),
    Wall(WallContact),
    Projectile(ProjectileContact),
    Unknown,
}

/// Check overlap between two circles
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

/// Even-odd point-in-polygon test
pub fn point_in_polygon(point: Vec2, ring: &[Vec2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on segment `a`-`b`
#[inline]
fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Check overlap between a circle and a closed polygon outline.
///
/// True if the centre is inside or any edge comes within `radius`.
pub fn circle_overlaps_polygon(center: Vec2, radius: f32, ring: &[Vec2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    if point_in_polygon(center, ring) {
        return true;
    }
    let radius_sq = radius * radius;
    (0..n).any(|i| {
        closest_on_segment(center, ring[i], ring[(i + 1) % n]).distance_squared(center) < radius_sq
    })
}

/// Turns "currently touching" sets into begin-contact events.
///
/// A pair raises one event on the frame it starts touching and stays silent
/// until it separates.
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: BTreeSet<(Collider, Collider)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the touching set and return pairs that were not touching before
    pub fn update<I>(&mut self, touching: I) -> Vec<CollisionEvent>
    where
        I: IntoIterator<Item = (Collider, Collider)>,
    {
        let current: BTreeSet<(Collider, Collider)> = touching
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        let began = current
            .difference(&self.touching)
            .map(|&(a, b)| CollisionEvent::new(a, b))
            .collect();
        self.touching = current;
        began
    }

    pub fn is_touching(&self, a: Collider, b: Collider) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.touching.contains(&key)
    }
}
