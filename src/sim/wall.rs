//! Arc wall entity
//!
//! A wall owns its arc parameters and a cached mesh. Changing a parameter
//! only marks the wall dirty; the mesh is rebuilt on the next tick. The mesh
//! and collider live in wall-local space (arc centred on +X), and the host
//! places them using `position` and `rotation`.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arc::{ArcMesh, ArcParams, GeometryError, build_arc_mesh, subdivisions_for};
use super::collision::{CollisionOther, PlayerContact, ProjectileContact, WallContact};
use crate::consts::{
    MAX_SUBDIVISIONS, MIN_SUBDIVISIONS, WALL_ANGLE, WALL_EROSION_PER_HIT, WALL_MIN_THICKNESS,
    WALL_RADIUS, WALL_ROTATION_SPEED, WALL_SMOOTHNESS, WALL_THICKNESS,
};
use crate::{local_to_world, normalize_degrees};

/// Wall identifier, unique within an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub u32);

/// Geometry, transform and cached mesh of a wall
#[derive(Debug, Clone)]
pub struct WallBody {
    id: WallId,
    radius: f32,
    thickness: f32,
    angle: f32,
    smoothness: u32,
    /// World position of the arc centre
    pub position: Vec2,
    /// Current rotation (degrees)
    pub rotation: f32,
    /// Rotation the wall is turning toward (degrees)
    pub target_rotation: f32,
    /// Max degrees per second
    pub rotation_speed: f32,
    dirty: bool,
    mesh: Option<ArcMesh>,
    /// Last rebuild failure, kept so a stuck wall logs once
    failure: Option<GeometryError>,
}

impl WallBody {
    pub fn new(id: WallId) -> Self {
        Self {
            id,
            radius: WALL_RADIUS,
            thickness: WALL_THICKNESS,
            angle: WALL_ANGLE,
            smoothness: WALL_SMOOTHNESS,
            position: Vec2::ZERO,
            rotation: 0.0,
            target_rotation: 0.0,
            rotation_speed: WALL_ROTATION_SPEED,
            dirty: true,
            mesh: None,
            failure: None,
        }
    }

    pub fn id(&self) -> WallId {
        self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn smoothness(&self) -> u32 {
        self.smoothness
    }

    pub fn set_radius(&mut self, radius: f32) {
        if self.radius != radius {
            self.radius = radius;
            self.dirty = true;
        }
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        if self.thickness != thickness {
            self.thickness = thickness;
            self.dirty = true;
        }
    }

    pub fn set_angle(&mut self, angle: f32) {
        if self.angle != angle {
            self.angle = angle;
            self.dirty = true;
        }
    }

    /// Smoothness multiplier, kept within the subdivision bounds
    pub fn set_smoothness(&mut self, smoothness: u32) {
        let smoothness = smoothness.clamp(MIN_SUBDIVISIONS, MAX_SUBDIVISIONS);
        if self.smoothness != smoothness {
            self.smoothness = smoothness;
            self.dirty = true;
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Arc parameters derived from the current settings
    pub fn params(&self) -> ArcParams {
        ArcParams::new(
            self.radius,
            self.thickness,
            self.angle,
            subdivisions_for(self.angle, self.smoothness),
        )
    }

    /// Regenerate mesh and collider from the current parameters.
    ///
    /// On failure the mesh is dropped so the wall neither renders nor
    /// collides, and the wall stays dirty.
    pub fn rebuild(&mut self) -> Result<(), GeometryError> {
        match build_arc_mesh(&self.params()) {
            Ok(mesh) => {
                log::debug!(
                    "Wall {} rebuilt: {} vertices, {} triangles",
                    self.id.0,
                    mesh.vertices.len(),
                    mesh.triangle_count()
                );
                self.mesh = Some(mesh);
                self.dirty = false;
                self.failure = None;
                Ok(())
            }
            Err(err) => {
                self.mesh = None;
                if self.failure.as_ref() != Some(&err) {
                    match err {
                        GeometryError::IndexOutOfRange { .. } => {
                            log::error!("Wall {} triangulation failed: {err}", self.id.0)
                        }
                        _ => log::warn!("Wall {} has degenerate geometry: {err}", self.id.0),
                    }
                }
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn mesh(&self) -> Option<&ArcMesh> {
        self.mesh.as_ref()
    }

    /// Local-space collision ring, empty while the wall is degenerate
    pub fn collider(&self) -> &[Vec2] {
        match &self.mesh {
            Some(mesh) => mesh.collider(),
            None => &[],
        }
    }

    /// Collision ring transformed into world space
    pub fn world_collider(&self) -> Vec<Vec2> {
        self.collider()
            .iter()
            .map(|&p| local_to_world(p, self.position, self.rotation))
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn last_failure(&self) -> Option<&GeometryError> {
        self.failure.as_ref()
    }

    /// Turn toward `target_rotation` by at most `rotation_speed * dt`, shortest way round.
    ///
    /// A zero, negative or NaN step limit leaves the rotation alone.
    pub fn rotate_toward(&mut self, dt: f32) {
        let max_delta = self.rotation_speed * dt;
        if !(max_delta > 0.0) {
            return;
        }
        let delta = normalize_degrees(self.target_rotation - self.rotation);
        let step = delta.clamp(-max_delta, max_delta);
        self.rotation = normalize_degrees(self.rotation + step);
    }

    /// Snapshot for the other side of a collision
    pub fn contact(&self) -> WallContact {
        WallContact {
            id: self.id,
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// Type-specific reactions of a wall. Every hook defaults to a no-op.
pub trait WallBehavior: fmt::Debug {
    fn on_update(&mut self, _wall: &mut WallBody, _dt: f32) {}

    fn on_projectile_collision(&mut self, _wall: &mut WallBody, _projectile: &ProjectileContact) {}

    fn on_player_collision(&mut self, _wall: &mut WallBody, _player: &PlayerContact) {}

    fn on_wall_collision(&mut self, _wall: &mut WallBody, _other: &WallContact) {}
}

/// A wall that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWall;

impl WallBehavior for StaticWall {}

/// A wall that thins out a little with every projectile hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErodingWall {
    /// Thickness lost per hit
    pub erosion: f32,
    /// Thickness floor
    pub min_thickness: f32,
    hits: u32,
}

impl ErodingWall {
    pub fn new(erosion: f32, min_thickness: f32) -> Self {
        Self {
            erosion,
            min_thickness,
            hits: 0,
        }
    }

    /// Projectile hits taken so far
    pub fn hits(&self) -> u32 {
        self.hits
    }
}

impl Default for ErodingWall {
    fn default() -> Self {
        Self::new(WALL_EROSION_PER_HIT, WALL_MIN_THICKNESS)
    }
}

impl WallBehavior for ErodingWall {
    fn on_projectile_collision(&mut self, wall: &mut WallBody, projectile: &ProjectileContact) {
        self.hits += 1;
        let thinner = (wall.thickness() - self.erosion).max(self.min_thickness);
        wall.set_thickness(thinner);
        log::debug!(
            "Wall {} eroded to {:.3} by {} (hit {})",
            wall.id().0,
            wall.thickness(),
            projectile.kind.as_str(),
            self.hits
        );
    }
}

/// Wall behaviour selector for config files
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WallKind {
    #[default]
    Static,
    Eroding {
        #[serde(default = "default_erosion")]
        erosion: f32,
        #[serde(default = "default_min_thickness")]
        min_thickness: f32,
    },
}

fn default_erosion() -> f32 {
    WALL_EROSION_PER_HIT
}

fn default_min_thickness() -> f32 {
    WALL_MIN_THICKNESS
}

impl WallKind {
    pub fn behavior(&self) -> Box<dyn WallBehavior> {
        match *self {
            WallKind::Static => Box::new(StaticWall),
            WallKind::Eroding {
                erosion,
                min_thickness,
            } => Box::new(ErodingWall::new(erosion, min_thickness)),
        }
    }
}

/// A wall segment plus its bound behaviour
#[derive(Debug)]
pub struct Wall {
    body: WallBody,
    behavior: Box<dyn WallBehavior>,
}

impl Wall {
    pub fn new(body: WallBody, behavior: Box<dyn WallBehavior>) -> Self {
        Self { body, behavior }
    }

    pub fn id(&self) -> WallId {
        self.body.id
    }

    pub fn body(&self) -> &WallBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut WallBody {
        &mut self.body
    }

    pub fn behavior(&self) -> &dyn WallBehavior {
        self.behavior.as_ref()
    }

    /// Rebuild if dirty, turn toward the target rotation, then run the behaviour
    pub fn tick(&mut self, dt: f32) {
        if self.body.dirty {
            // Failure is logged and leaves the wall invisible
            let _ = self.body.rebuild();
        }
        self.body.rotate_toward(dt);
        self.behavior.on_update(&mut self.body, dt);
    }

    /// Forward a collision to the behaviour. Unrecognised colliders are ignored.
    pub fn handle_collision(&mut self, other: &CollisionOther) {
        match other {
            CollisionOther::Projectile(projectile) => {
                self.behavior.on_projectile_collision(&mut self.body, projectile)
            }
            CollisionOther::Player(player) => self.behavior.on_player_collision(&mut self.body, player),
            CollisionOther::Wall(wall) => self.behavior.on_wall_collision(&mut self.body, wall),
            CollisionOther::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::behavior::ProjectileKind;
    use crate::sim::pool::ProjectilePool;

    fn wall() -> Wall {
        Wall::new(WallBody::new(WallId(7)), Box::new(StaticWall))
    }

    fn projectile_contact() -> ProjectileContact {
        let mut pool = ProjectilePool::default();
        let handle = pool.spawn(ProjectileKind::BasicBall, Vec2::ZERO, Vec2::X);
        pool.contact(handle).unwrap()
    }

    #[test]
    fn test_new_wall_builds_on_first_tick() {
        let mut w = wall();
        assert!(w.body().is_dirty());
        assert!(!w.body().is_visible());
        w.tick(0.0);
        assert!(!w.body().is_dirty());
        assert!(w.body().is_visible());
        assert!(w.body().collider().len() >= 3);
    }

    #[test]
    fn test_setters_mark_dirty_only_on_change() {
        let mut w = wall();
        w.tick(0.0);
        w.body_mut().set_radius(WALL_RADIUS);
        assert!(!w.body().is_dirty());
        w.body_mut().set_angle(120.0);
        assert!(w.body().is_dirty());
        w.tick(0.0);
        assert!(!w.body().is_dirty());
        assert_eq!(w.body().params().angle, 120.0);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut body = WallBody::new(WallId(0));
        body.rebuild().unwrap();
        let first = body.mesh().cloned();
        body.rebuild().unwrap();
        assert_eq!(body.mesh().cloned(), first);
    }

    #[test]
    fn test_degenerate_wall_clears_mesh_and_stays_dirty() {
        let mut w = wall();
        w.tick(0.0);
        assert!(w.body().is_visible());

        w.body_mut().set_thickness(5.0);
        w.tick(0.0);
        assert!(!w.body().is_visible());
        assert!(w.body().collider().is_empty());
        assert!(w.body().world_collider().is_empty());
        assert!(w.body().is_dirty());
        assert!(matches!(
            w.body().last_failure(),
            Some(GeometryError::InvalidThickness { .. })
        ));

        // Fixing the parameter recovers on the next tick
        w.body_mut().set_thickness(0.25);
        w.tick(0.0);
        assert!(w.body().is_visible());
        assert!(w.body().last_failure().is_none());
    }

    #[test]
    fn test_smoothness_is_clamped() {
        let mut body = WallBody::new(WallId(0));
        body.set_smoothness(1000);
        assert_eq!(body.smoothness(), MAX_SUBDIVISIONS);
        body.set_smoothness(0);
        assert_eq!(body.smoothness(), MIN_SUBDIVISIONS);
    }

    #[test]
    fn test_rotation_takes_shortest_path() {
        let mut body = WallBody::new(WallId(0));
        body.rotation = 170.0;
        body.target_rotation = -170.0;
        body.rotation_speed = 180.0;
        body.rotate_toward(0.05);
        // 9 degrees forward across the seam, not 340 back
        assert!((body.rotation - 179.0).abs() < 1e-3);
        body.rotate_toward(0.05);
        assert!((body.rotation - (-172.0)).abs() < 1e-3);
        body.rotate_toward(1.0);
        assert!((body.rotation - (-170.0)).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_survives_extreme_targets() {
        let mut body = WallBody::new(WallId(0));
        body.target_rotation = 1.0e10;
        body.rotate_toward(0.01);
        assert!((-180.0..180.0).contains(&body.rotation));

        body.rotation = 10.0;
        body.target_rotation = f32::INFINITY;
        body.rotate_toward(0.01);
        assert_eq!(body.rotation, 10.0);

        body.target_rotation = 90.0;
        body.rotation_speed = -50.0;
        body.rotate_toward(0.1);
        assert_eq!(body.rotation, 10.0);
        body.rotation_speed = f32::NAN;
        body.rotate_toward(0.1);
        assert_eq!(body.rotation, 10.0);
    }

    #[test]
    fn test_world_collider_follows_transform() {
        let mut body = WallBody::new(WallId(0));
        body.rebuild().unwrap();
        body.position = Vec2::new(10.0, 0.0);
        body.rotation = 180.0;
        let world = body.world_collider();
        assert_eq!(world.len(), body.collider().len());
        // Arc faces -X after a half turn
        assert!(world.iter().all(|p| p.x < 10.0));
    }

    #[test]
    fn test_eroding_wall_thins_and_rebuilds() {
        let kind = WallKind::Eroding {
            erosion: 0.2,
            min_thickness: 0.1,
        };
        let mut w = Wall::new(WallBody::new(WallId(1)), kind.behavior());
        w.tick(0.0);
        let hit = CollisionOther::Projectile(projectile_contact());

        w.handle_collision(&hit);
        assert!((w.body().thickness() - 0.3).abs() < 1e-5);
        assert!(w.body().is_dirty());
        w.tick(0.0);
        assert!(!w.body().is_dirty());

        w.handle_collision(&hit);
        w.handle_collision(&hit);
        assert!((w.body().thickness() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_eroding_wall_counts_hits() {
        let mut erosion = ErodingWall::new(0.1, 0.05);
        let mut body = WallBody::new(WallId(2));
        let hit = projectile_contact();
        for _ in 0..3 {
            erosion.on_projectile_collision(&mut body, &hit);
        }
        assert_eq!(erosion.hits(), 3);
        // Floor reached: further hits still count
        for _ in 0..10 {
            erosion.on_projectile_collision(&mut body, &hit);
        }
        assert_eq!(erosion.hits(), 13);
        assert!((body.thickness() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_collider_is_ignored() {
        let mut w = wall();
        w.tick(0.0);
        w.handle_collision(&CollisionOther::Unknown);
        assert!(w.body().is_visible());
        assert!(!w.body().is_dirty());
    }

    #[test]
    fn test_wall_kind_serde() {
        let kind: WallKind = serde_json::from_str(r#"{"type":"eroding","erosion":0.1}"#).unwrap();
        assert_eq!(
            kind,
            WallKind::Eroding {
                erosion: 0.1,
                min_thickness: WALL_MIN_THICKNESS
            }
        );
        let kind: WallKind = serde_json::from_str(r#"{"type":"static"}"#).unwrap();
        assert_eq!(kind, WallKind::Static);
    }
}
