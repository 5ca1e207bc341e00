//! Arena simulation context
//!
//! Owns the player, the walls and the projectile pool, and is passed
//! explicitly to whatever needs to spawn or despawn. A host with its own
//! physics calls `tick` and feeds collisions to `handle_collision`; a host
//! without one calls `step`, which also runs the built-in contact detection.

use glam::Vec2;

use super::behavior::{ProjectileKind, ProjectileTuning};
use super::collision::{
    Collider, CollisionEvent, CollisionOther, ContactTracker, circle_overlaps_polygon,
    circles_overlap,
};
use super::player::Player;
use super::pool::{PoolError, ProjectileHandle, ProjectilePool};
use super::wall::{Wall, WallBehavior, WallBody, WallId};
use crate::config::ArenaConfig;
use crate::consts::ARENA_BOUNDS_RADIUS;
use crate::render::RenderFrame;

#[derive(Debug)]
pub struct Arena {
    pub player: Player,
    walls: Vec<Wall>,
    pool: ProjectilePool,
    contacts: ContactTracker,
    /// Projectiles past this distance from the origin are out of bounds
    pub bounds_radius: f32,
    next_wall_id: u32,
    ticks: u64,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ProjectileTuning::default())
    }
}

impl Arena {
    /// Empty arena: default player, no walls
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            player: Player::default(),
            walls: Vec::new(),
            pool: ProjectilePool::new(tuning),
            contacts: ContactTracker::new(),
            bounds_radius: ARENA_BOUNDS_RADIUS,
            next_wall_id: 0,
            ticks: 0,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        let mut arena = Self::new(config.projectiles.clone());
        arena.bounds_radius = config.bounds_radius;
        arena.player.position = config.player.position;
        arena.player.aim = config.player.aim;
        arena.player.radius = config.player.radius;
        arena.pool.prewarm(config.prewarm);

        for wall in &config.walls {
            let id = arena.add_wall(wall.kind.behavior());
            if let Some(w) = arena.wall_mut(id) {
                let body = w.body_mut();
                body.position = wall.position;
                body.rotation = wall.rotation;
                body.target_rotation = wall.rotation;
                body.rotation_speed = wall.rotation_speed;
                body.set_radius(wall.radius);
                body.set_thickness(wall.thickness);
                body.set_angle(wall.angle);
                body.set_smoothness(wall.smoothness);
            }
        }

        log::info!(
            "Arena ready: {} walls, {} pooled slots, bounds {}",
            arena.walls.len(),
            arena.pool.capacity(),
            arena.bounds_radius
        );
        arena
    }

    /// Add a wall with default geometry. It builds its mesh on the next tick.
    pub fn add_wall(&mut self, behavior: Box<dyn WallBehavior>) -> WallId {
        let id = WallId(self.next_wall_id);
        self.next_wall_id += 1;
        self.walls.push(Wall::new(WallBody::new(id), behavior));
        id
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id() == id)
    }

    pub fn wall_mut(&mut self, id: WallId) -> Option<&mut Wall> {
        self.walls.iter_mut().find(|w| w.id() == id)
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ProjectilePool {
        &mut self.pool
    }

    /// Ticks advanced so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn spawn(&mut self, kind: ProjectileKind, position: Vec2, velocity: Vec2) -> ProjectileHandle {
        self.pool.spawn(kind, position, velocity)
    }

    pub fn despawn(&mut self, handle: ProjectileHandle) -> Result<(), PoolError> {
        self.pool.despawn(handle)
    }

    /// Launch a projectile from the player along its aim at the kind's speed
    pub fn fire(&mut self, kind: ProjectileKind) -> ProjectileHandle {
        let speed = self.pool.tuning().spec(kind).stats.speed;
        let velocity = self.player.aim_direction() * speed;
        self.pool.spawn(kind, self.player.position, velocity)
    }

    /// Advance walls then projectiles by one tick
    pub fn tick(&mut self, dt: f32) {
        for wall in &mut self.walls {
            wall.tick(dt);
        }
        self.pool.tick(dt);
        self.ticks += 1;
    }

    /// Snapshot one side of a collision. `None` if it no longer exists.
    fn resolve(&self, collider: Collider) -> Option<CollisionOther> {
        match collider {
            Collider::Player => Some(CollisionOther::Player(self.player.contact())),
            Collider::Wall(id) => self.wall(id).map(|w| CollisionOther::Wall(w.body().contact())),
            Collider::Projectile(handle) => self.pool.contact(handle).map(CollisionOther::Projectile),
            Collider::Unknown => Some(CollisionOther::Unknown),
        }
    }

    fn deliver(&mut self, target: Collider, other: &CollisionOther) {
        match target {
            Collider::Wall(id) => {
                if let Some(wall) = self.wall_mut(id) {
                    wall.handle_collision(other);
                }
            }
            Collider::Projectile(handle) => {
                self.pool.handle_collision(handle, other);
            }
            // Neither has behaviour of its own
            Collider::Player | Collider::Unknown => {}
        }
    }

    /// Dispatch a begin-contact event to both sides.
    ///
    /// Both snapshots are taken before either side reacts. Events naming a
    /// despawned projectile or a missing wall are dropped.
    pub fn handle_collision(&mut self, event: CollisionEvent) {
        let (Some(other_a), Some(other_b)) = (self.resolve(event.a), self.resolve(event.b)) else {
            log::debug!("Dropping collision {:?} <-> {:?}: body gone", event.a, event.b);
            return;
        };
        self.deliver(event.a, &other_b);
        self.deliver(event.b, &other_a);
    }

    /// Every pair of bodies currently overlapping
    pub fn detect_contacts(&self) -> Vec<(Collider, Collider)> {
        let mut pairs = Vec::new();
        let wall_rings: Vec<(WallId, Vec<Vec2>)> = self
            .walls
            .iter()
            .filter(|w| w.body().is_visible())
            .map(|w| (w.id(), w.body().world_collider()))
            .collect();

        for (id, ring) in &wall_rings {
            if circle_overlaps_polygon(self.player.position, self.player.radius, ring) {
                pairs.push((Collider::Player, Collider::Wall(*id)));
            }
        }

        let projectiles: Vec<(ProjectileHandle, Vec2, f32)> = self
            .pool
            .iter()
            .map(|(handle, p)| (handle, p.body().position, p.body().radius()))
            .collect();

        for (i, &(handle, position, radius)) in projectiles.iter().enumerate() {
            let me = Collider::Projectile(handle);

            if position.length() > self.bounds_radius {
                pairs.push((me, Collider::Unknown));
                continue;
            }

            for (id, ring) in &wall_rings {
                if circle_overlaps_polygon(position, radius, ring) {
                    pairs.push((me, Collider::Wall(*id)));
                }
            }

            if circles_overlap(position, radius, self.player.position, self.player.radius) {
                pairs.push((me, Collider::Player));
            }

            for &(other, other_pos, other_radius) in &projectiles[i + 1..] {
                if circles_overlap(position, radius, other_pos, other_radius) {
                    pairs.push((me, Collider::Projectile(other)));
                }
            }
        }
        pairs
    }

    /// Tick, detect contacts, and dispatch the ones that just began.
    ///
    /// Returns the dispatched events.
    pub fn step(&mut self, dt: f32) -> Vec<CollisionEvent> {
        self.tick(dt);
        let began = self.contacts.update(self.detect_contacts());
        for &event in &began {
            self.handle_collision(event);
        }
        began
    }

    /// Render snapshot of the current state
    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::capture(self)
    }
}
