//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Stable iteration order (by slot index and wall id)
//! - No rendering or platform dependencies

pub mod arc;
pub mod arena;
pub mod behavior;
pub mod collision;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod triangulate;
pub mod wall;

pub use arc::{ArcMesh, ArcParams, GeometryError, build_arc_mesh};
pub use arena::Arena;
pub use behavior::{BallSpec, BounceLimit, ProjectileBehavior, ProjectileKind, ProjectileTuning};
pub use collision::{Collider, CollisionEvent, CollisionOther};
pub use player::Player;
pub use pool::{PoolError, ProjectileHandle, ProjectilePool};
pub use projectile::{Projectile, ProjectileBody};
pub use triangulate::{Triangulation, triangulate_polygon};
pub use wall::{Wall, WallBehavior, WallBody, WallId, WallKind};
