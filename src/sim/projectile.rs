//! Projectile entity
//!
//! Motion state plus the behaviour bound to it. Ticks and collisions are a
//! no-op once the body has been destroyed; the pool reclaims it from there.

use glam::Vec2;

use super::behavior::{ProjectileBehavior, ProjectileKind, ProjectileStats};
use super::collision::{CollisionOther, ProjectileContact};
use super::pool::ProjectileHandle;
use crate::consts::PROJECTILE_BASE_RADIUS;

/// Motion state of a projectile
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Per-tick velocity multiplier
    pub drag: f32,
    /// Seconds left before expiry
    pub life_timer: f32,
    /// Total lifetime this spawn started with
    pub lifetime: f32,
    /// Sprite / collider scale
    pub size: f32,
    exists: bool,
}

impl ProjectileBody {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            drag: 1.0,
            life_timer: 0.0,
            lifetime: 0.0,
            size: 1.0,
            exists: true,
        }
    }

    /// Copy lifetime, drag and size from a stats block and restart the countdown
    pub fn apply_stats(&mut self, stats: &ProjectileStats) {
        self.lifetime = stats.lifetime;
        self.life_timer = stats.lifetime;
        self.drag = stats.drag;
        self.size = stats.size;
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Request destruction. Idempotent.
    pub fn destroy(&mut self) {
        self.exists = false;
    }

    /// Seconds since spawn
    pub fn age(&self) -> f32 {
        self.lifetime - self.life_timer
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Direction of travel in degrees (0 when at rest)
    pub fn heading(&self) -> f32 {
        if self.velocity == Vec2::ZERO {
            0.0
        } else {
            self.velocity.y.atan2(self.velocity.x).to_degrees()
        }
    }

    /// Collider radius
    pub fn radius(&self) -> f32 {
        PROJECTILE_BASE_RADIUS * self.size
    }
}

/// A pooled projectile: body plus bound behaviour
#[derive(Debug)]
pub struct Projectile {
    body: ProjectileBody,
    behavior: Box<dyn ProjectileBehavior>,
}

impl Projectile {
    pub fn new(behavior: Box<dyn ProjectileBehavior>, position: Vec2, velocity: Vec2) -> Self {
        let mut projectile = Self {
            body: ProjectileBody::new(position, velocity),
            behavior,
        };
        projectile.behavior.init(&mut projectile.body);
        projectile
    }

    /// Reset everything for reuse from the free-list
    pub(crate) fn respawn(
        &mut self,
        behavior: Box<dyn ProjectileBehavior>,
        position: Vec2,
        velocity: Vec2,
    ) {
        self.body = ProjectileBody::new(position, velocity);
        self.behavior = behavior;
        self.behavior.init(&mut self.body);
    }

    pub fn body(&self) -> &ProjectileBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut ProjectileBody {
        &mut self.body
    }

    pub fn behavior(&self) -> &dyn ProjectileBehavior {
        self.behavior.as_ref()
    }

    pub fn kind(&self) -> ProjectileKind {
        self.behavior.kind()
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.body.exists()
    }

    /// Advance one tick: lifetime check, drag, move, behaviour hook.
    ///
    /// Expiry destroys the body, fires `on_expire`, and ends the tick.
    pub fn advance(&mut self, dt: f32) {
        if !self.body.exists() {
            return;
        }

        self.body.life_timer -= dt;
        if self.body.life_timer <= 0.0 {
            self.body.destroy();
            self.behavior.on_expire(&mut self.body);
            return;
        }

        self.body.velocity *= self.body.drag;
        self.body.position += self.body.velocity * dt;
        self.behavior.on_update(&mut self.body, dt);
    }

    /// Route a collision to the matching behaviour hook.
    ///
    /// Anything unrecognised destroys the projectile.
    pub fn handle_collision(&mut self, other: &CollisionOther) {
        if !self.body.exists() {
            return;
        }
        match other {
            CollisionOther::Projectile(projectile) => {
                self.behavior.on_projectile_collision(&mut self.body, projectile)
            }
            CollisionOther::Wall(wall) => self.behavior.on_wall_collision(&mut self.body, wall),
            CollisionOther::Player(player) => {
                self.behavior.on_player_collision(&mut self.body, player)
            }
            CollisionOther::Unknown => {
                log::debug!("{} hit an unknown collider, destroying", self.kind().as_str());
                self.body.destroy();
            }
        }
    }

    /// Snapshot for the other side of a collision
    pub fn contact(&self, handle: ProjectileHandle) -> ProjectileContact {
        ProjectileContact {
            handle,
            kind: self.kind(),
            position: self.body.position,
            velocity: self.body.velocity,
            size: self.body.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::behavior::{BallSpec, ProjectileTuning};
    use crate::sim::collision::{PlayerContact, WallContact};
    use crate::sim::wall::WallId;

    #[derive(Debug, Default)]
    struct Calls {
        updates: u32,
        expiries: u32,
        player_hits: u32,
    }

    /// Records hook calls so tick ordering can be checked
    #[derive(Debug)]
    struct Recorder {
        stats: ProjectileStats,
        calls: Rc<RefCell<Calls>>,
    }

    impl ProjectileBehavior for Recorder {
        fn kind(&self) -> ProjectileKind {
            ProjectileKind::BasicBall
        }

        fn stats(&self) -> &ProjectileStats {
            &self.stats
        }

        fn on_update(&mut self, body: &mut ProjectileBody, _dt: f32) {
            assert!(body.exists());
            self.calls.borrow_mut().updates += 1;
        }

        fn on_expire(&mut self, body: &mut ProjectileBody) {
            assert!(!body.exists());
            self.calls.borrow_mut().expiries += 1;
        }

        fn on_player_collision(&mut self, _body: &mut ProjectileBody, _player: &PlayerContact) {
            self.calls.borrow_mut().player_hits += 1;
        }
    }

    fn recorder(lifetime: f32, drag: f32) -> (Box<Recorder>, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let recorder = Recorder {
            stats: ProjectileStats {
                lifetime,
                drag,
                ..Default::default()
            },
            calls: Rc::clone(&calls),
        };
        (Box::new(recorder), calls)
    }

    fn player_contact() -> CollisionOther {
        CollisionOther::Player(PlayerContact { position: Vec2::ZERO })
    }

    #[test]
    fn test_drag_then_move() {
        let (behavior, calls) = recorder(10.0, 0.5);
        let mut p = Projectile::new(behavior, Vec2::ZERO, Vec2::new(4.0, 0.0));
        p.advance(0.5);
        // Velocity halved first, then applied
        assert_eq!(p.body().velocity, Vec2::new(2.0, 0.0));
        assert_eq!(p.body().position, Vec2::new(1.0, 0.0));
        assert!((p.body().age() - 0.5).abs() < 1e-6);
        assert_eq!(calls.borrow().updates, 1);
    }

    #[test]
    fn test_lifetime_expiry() {
        // 1 second at dt = 0.25: alive for three ticks, destroyed on the fourth
        let (behavior, calls) = recorder(1.0, 1.0);
        let mut p = Projectile::new(behavior, Vec2::ZERO, Vec2::X);
        for _ in 0..3 {
            p.advance(0.25);
            assert!(p.exists());
        }
        p.advance(0.25);
        assert!(!p.exists());
        // No movement or update on the expiring tick
        assert_eq!(p.body().position, Vec2::new(0.75, 0.0));
        assert_eq!(calls.borrow().updates, 3);
        assert_eq!(calls.borrow().expiries, 1);

        // Destroyed bodies ignore further ticks
        p.advance(0.25);
        assert_eq!(p.body().position, Vec2::new(0.75, 0.0));
        assert_eq!(calls.borrow().expiries, 1);
    }

    /// Ticks survived before the lifetime countdown destroys the projectile
    fn ticks_until_expiry(lifetime: f32, dt: f32) -> u32 {
        let (behavior, calls) = recorder(lifetime, 1.0);
        let mut p = Projectile::new(behavior, Vec2::ZERO, Vec2::X);
        let mut ticks = 0;
        while p.exists() {
            assert!(ticks < 10_000, "projectile never expired");
            p.advance(dt);
            ticks += 1;
        }
        assert_eq!(calls.borrow().expiries, 1);
        assert_eq!(calls.borrow().updates, ticks - 1);
        ticks
    }

    #[test]
    fn test_lifetime_expiry_at_frame_rate() {
        // Repeated f32 subtraction leaves a small positive remainder at the
        // nominal tick, so expiry lands one tick after lifetime / dt
        assert_eq!(ticks_until_expiry(2.0, 1.0 / 60.0), 121);
        assert_eq!(ticks_until_expiry(1.0, 1.0 / 60.0), 61);
        assert_eq!(ticks_until_expiry(0.5, 1.0 / 120.0), 61);
    }

    #[test]
    fn test_collision_dispatch() {
        let (behavior, calls) = recorder(10.0, 1.0);
        let mut p = Projectile::new(behavior, Vec2::ZERO, Vec2::X);
        p.handle_collision(&player_contact());
        assert!(p.exists());
        assert_eq!(calls.borrow().player_hits, 1);
    }

    #[test]
    fn test_unknown_collider_destroys() {
        let (behavior, calls) = recorder(10.0, 1.0);
        let mut p = Projectile::new(behavior, Vec2::ZERO, Vec2::X);
        p.handle_collision(&CollisionOther::Unknown);
        assert!(!p.exists());

        // No callbacks after destruction
        p.handle_collision(&player_contact());
        assert_eq!(calls.borrow().player_hits, 0);
    }

    #[test]
    fn test_respawn_resets_state() {
        let tuning = ProjectileTuning::default();
        let mut p = Projectile::new(
            tuning.instantiate(ProjectileKind::BasicBall),
            Vec2::ZERO,
            Vec2::X,
        );
        p.handle_collision(&CollisionOther::Wall(WallContact {
            id: WallId(0),
            position: Vec2::new(-1.0, 0.0),
            rotation: 0.0,
        }));
        p.body_mut().destroy();

        p.respawn(
            tuning.instantiate(ProjectileKind::Pellet),
            Vec2::new(2.0, 2.0),
            Vec2::Y,
        );
        let pellet = BallSpec::pellet().stats;
        assert!(p.exists());
        assert_eq!(p.kind(), ProjectileKind::Pellet);
        assert_eq!(p.body().position, Vec2::new(2.0, 2.0));
        assert_eq!(p.body().velocity, Vec2::Y);
        assert_eq!(p.body().size, pellet.size);
        assert_eq!(p.body().drag, pellet.drag);
        assert_eq!(p.body().life_timer, pellet.lifetime);
    }

    #[test]
    fn test_heading_and_radius() {
        let (behavior, _) = recorder(1.0, 1.0);
        let p = Projectile::new(behavior, Vec2::ZERO, Vec2::new(0.0, 3.0));
        assert!((p.body().heading() - 90.0).abs() < 1e-4);
        assert!((p.body().radius() - PROJECTILE_BASE_RADIUS).abs() < 1e-6);
    }
}
