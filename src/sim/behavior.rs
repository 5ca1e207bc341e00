//! Projectile behaviours
//!
//! A projectile entity owns its motion state; a behaviour decides how it
//! reacts to ticks, expiry and collisions. Behaviours never own the entity:
//! every hook receives the entity's body to read or change.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collision::{PlayerContact, ProjectileContact, WallContact};
use super::projectile::ProjectileBody;

/// Projectile types that can be spawned from the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Bouncy ball, a few bounces before it breaks
    BasicBall,
    /// Short-lived dragged shot, breaks on the first wall
    Pellet,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 2] = [ProjectileKind::BasicBall, ProjectileKind::Pellet];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectileKind::BasicBall => "BasicBall",
            ProjectileKind::Pellet => "Pellet",
        }
    }
}

/// Per-type numbers shared by every projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileStats {
    /// Damage dealt on hit
    pub damage: f32,
    /// Armour ignored on hit
    pub armor_penetration: f32,
    /// Launch speed (units/s)
    pub speed: f32,
    /// Scale of the sprite and collider
    pub size: f32,
    /// Seconds before the projectile expires
    pub lifetime: f32,
    /// Per-tick velocity multiplier. 1 = no drag; 0 would pin it in place.
    pub drag: f32,
    pub texture_id: u16,
}

impl Default for ProjectileStats {
    fn default() -> Self {
        Self {
            damage: 0.0,
            armor_penetration: 0.0,
            speed: 5.0,
            size: 1.0,
            lifetime: 5.0,
            drag: 1.0,
            texture_id: 0,
        }
    }
}

/// A tuning number outside its allowed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatError {
    pub field: &'static str,
    pub value: f32,
    pub expected: &'static str,
}

impl fmt::Display for StatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be {} (got {})", self.field, self.expected, self.value)
    }
}

impl std::error::Error for StatError {}

fn check(field: &'static str, value: f32, expected: &'static str, ok: bool) -> Result<(), StatError> {
    if ok {
        Ok(())
    } else {
        Err(StatError {
            field,
            value,
            expected,
        })
    }
}

impl ProjectileStats {
    /// Reject values that would make a projectile blow up or never move
    pub fn validate(&self) -> Result<(), StatError> {
        check("drag", self.drag, "in (0, 1]", self.drag > 0.0 && self.drag <= 1.0)?;
        check("size", self.size, "positive", self.size > 0.0 && self.size.is_finite())?;
        check("lifetime", self.lifetime, "positive", self.lifetime > 0.0 && self.lifetime.is_finite())?;
        check("speed", self.speed, "finite and >= 0", self.speed >= 0.0 && self.speed.is_finite())?;
        check("damage", self.damage, "finite", self.damage.is_finite())?;
        check(
            "armor_penetration",
            self.armor_penetration,
            "finite",
            self.armor_penetration.is_finite(),
        )
    }
}

/// How many more wall bounces a ball survives.
///
/// Serialized as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum BounceLimit {
    Unlimited,
    Remaining(u32),
}

impl BounceLimit {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, BounceLimit::Remaining(0))
    }

    /// Use up one bounce. Unlimited never changes.
    pub fn consume(&mut self) {
        if let BounceLimit::Remaining(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

impl TryFrom<i32> for BounceLimit {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(BounceLimit::Unlimited),
            n if n >= 0 => Ok(BounceLimit::Remaining(n as u32)),
            n => Err(format!("bounce count must be -1 (unlimited) or >= 0, got {n}")),
        }
    }
}

impl From<BounceLimit> for i32 {
    fn from(limit: BounceLimit) -> Self {
        match limit {
            BounceLimit::Unlimited => -1,
            BounceLimit::Remaining(n) => n.min(i32::MAX as u32) as i32,
        }
    }
}

/// Tuning for a ball-type projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSpec {
    pub stats: ProjectileStats,
    /// Fraction of speed kept on a bounce. 1 = perfect bounce, <= 0 = breaks on contact.
    pub bounce_factor: f32,
    pub bounces: BounceLimit,
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            stats: ProjectileStats::default(),
            bounce_factor: 1.0,
            bounces: BounceLimit::Unlimited,
        }
    }
}

impl BallSpec {
    pub fn validate(&self) -> Result<(), StatError> {
        self.stats.validate()?;
        check(
            "bounce_factor",
            self.bounce_factor,
            "finite",
            self.bounce_factor.is_finite(),
        )
    }

    pub fn basic_ball() -> Self {
        Self {
            stats: ProjectileStats {
                damage: 5.0,
                speed: 7.0,
                lifetime: 20.0,
                size: 0.5,
                texture_id: 1,
                ..Default::default()
            },
            bounce_factor: 0.8,
            bounces: BounceLimit::Remaining(3),
        }
    }

    pub fn pellet() -> Self {
        Self {
            stats: ProjectileStats {
                damage: 2.0,
                speed: 12.0,
                lifetime: 2.0,
                size: 0.25,
                drag: 0.99,
                texture_id: 2,
                ..Default::default()
            },
            bounce_factor: 0.0,
            bounces: BounceLimit::Remaining(0),
        }
    }
}

/// Tuning table, one spec per projectile kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub basic_ball: BallSpec,
    pub pellet: BallSpec,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            basic_ball: BallSpec::basic_ball(),
            pellet: BallSpec::pellet(),
        }
    }
}

impl ProjectileTuning {
    pub fn spec(&self, kind: ProjectileKind) -> &BallSpec {
        match kind {
            ProjectileKind::BasicBall => &self.basic_ball,
            ProjectileKind::Pellet => &self.pellet,
        }
    }

    /// Check every kind's spec, naming the first bad one
    pub fn validate(&self) -> Result<(), (ProjectileKind, StatError)> {
        for kind in ProjectileKind::ALL {
            self.spec(kind).validate().map_err(|err| (kind, err))?;
        }
        Ok(())
    }

    /// Fresh behaviour for a kind
    pub fn instantiate(&self, kind: ProjectileKind) -> Box<dyn ProjectileBehavior> {
        Box::new(BallBehavior::new(kind, *self.spec(kind)))
    }
}

/// Type-specific reactions of a projectile.
///
/// Every hook is a no-op unless a variant overrides it.
pub trait ProjectileBehavior: fmt::Debug {
    fn kind(&self) -> ProjectileKind;

    fn stats(&self) -> &ProjectileStats;

    /// Prepare a freshly (re)spawned body: lifetime countdown, drag, size.
    fn init(&mut self, body: &mut ProjectileBody) {
        body.apply_stats(self.stats());
    }

    /// Runs at the end of every tick the projectile survives
    fn on_update(&mut self, _body: &mut ProjectileBody, _dt: f32) {}

    /// Runs once after the lifetime ran out (the body is already destroyed)
    fn on_expire(&mut self, _body: &mut ProjectileBody) {}

    fn on_wall_collision(&mut self, _body: &mut ProjectileBody, _wall: &WallContact) {}

    /// Most projectiles pass through each other
    fn on_projectile_collision(&mut self, _body: &mut ProjectileBody, _other: &ProjectileContact) {}

    fn on_player_collision(&mut self, _body: &mut ProjectileBody, _player: &PlayerContact) {}
}

/// A ball that bounces off walls a limited number of times
#[derive(Debug, Clone)]
pub struct BallBehavior {
    kind: ProjectileKind,
    spec: BallSpec,
    bounces_left: BounceLimit,
}

impl BallBehavior {
    pub fn new(kind: ProjectileKind, spec: BallSpec) -> Self {
        Self {
            kind,
            spec,
            bounces_left: spec.bounces,
        }
    }

    pub fn bounce_factor(&self) -> f32 {
        self.spec.bounce_factor
    }

    pub fn bounces_left(&self) -> BounceLimit {
        self.bounces_left
    }
}

impl ProjectileBehavior for BallBehavior {
    fn kind(&self) -> ProjectileKind {
        self.kind
    }

    fn stats(&self) -> &ProjectileStats {
        &self.spec.stats
    }

    fn init(&mut self, body: &mut ProjectileBody) {
        body.apply_stats(&self.spec.stats);
        self.bounces_left = self.spec.bounces;
    }

    fn on_wall_collision(&mut self, body: &mut ProjectileBody, wall: &WallContact) {
        if self.spec.bounce_factor <= 0.0 || self.bounces_left.is_exhausted() {
            body.destroy();
            return;
        }

        // Push away from the wall's centre rather than mirroring across the surface
        let away = (body.position - wall.position).normalize_or_zero();
        body.velocity = self.spec.bounce_factor * body.velocity.length() * away;
        self.bounces_left.consume();
        log::debug!(
            "{} bounced off wall {:?} ({:?} left)",
            self.kind.as_str(),
            wall.id,
            self.bounces_left
        );
    }
}
