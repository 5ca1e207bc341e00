//! Projectile pool
//!
//! Projectiles live in fixed slots that are never freed, only deactivated and
//! pushed onto a free-list. Handles carry a generation counter so a handle to
//! a despawned (or since reused) slot is detected instead of aliasing the new
//! occupant.
//!
//! Invariant: every slot index is in exactly one of `active` / `free`.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::behavior::{ProjectileKind, ProjectileTuning};
use super::collision::{CollisionOther, ProjectileContact};
use super::projectile::Projectile;

/// Stable reference to a pooled projectile, valid while it stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileHandle {
    index: u32,
    generation: u32,
}

impl ProjectileHandle {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Why a handle was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The handle never came from this pool
    UnknownHandle(ProjectileHandle),
    /// The slot was despawned (and maybe reused) since the handle was issued
    StaleHandle(ProjectileHandle),
    /// The slot is sitting on the free-list
    NotActive(ProjectileHandle),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::UnknownHandle(h) => write!(f, "unknown projectile handle {}:{}", h.index, h.generation),
            PoolError::StaleHandle(h) => write!(f, "stale projectile handle {}:{}", h.index, h.generation),
            PoolError::NotActive(h) => write!(f, "projectile {}:{} is not active", h.index, h.generation),
        }
    }
}

impl std::error::Error for PoolError {}

#[derive(Debug)]
struct Slot {
    generation: u32,
    active: bool,
    projectile: Projectile,
}

/// Owns every projectile, active or waiting for reuse
#[derive(Debug)]
pub struct ProjectilePool {
    tuning: ProjectileTuning,
    slots: Vec<Slot>,
    /// Active slot indices (ordered for deterministic iteration)
    active: BTreeSet<u32>,
    /// Inactive slot indices, most recently freed on top
    free: Vec<u32>,
}

impl Default for ProjectilePool {
    fn default() -> Self {
        Self::new(ProjectileTuning::default())
    }
}

impl ProjectilePool {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            tuning,
            slots: Vec::new(),
            active: BTreeSet::new(),
            free: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &ProjectileTuning {
        &self.tuning
    }

    /// Replace the tuning table. Affects future spawns only.
    pub fn set_tuning(&mut self, tuning: ProjectileTuning) {
        self.tuning = tuning;
    }

    /// Allocate `count` inactive slots up front
    pub fn prewarm(&mut self, count: usize) {
        for _ in 0..count {
            let index = self.slots.len() as u32;
            let mut projectile = Projectile::new(
                self.tuning.instantiate(ProjectileKind::BasicBall),
                Vec2::ZERO,
                Vec2::ZERO,
            );
            projectile.body_mut().destroy();
            self.slots.push(Slot {
                generation: 0,
                active: false,
                projectile,
            });
            self.free.push(index);
        }
        log::debug!("Pool prewarmed with {} slots ({} free)", count, self.free.len());
    }

    /// Activate a projectile of `kind`, reusing a free slot when there is one.
    ///
    /// The slot gets a fresh behaviour and a fully reset body either way.
    pub fn spawn(&mut self, kind: ProjectileKind, position: Vec2, velocity: Vec2) -> ProjectileHandle {
        let behavior = self.tuning.instantiate(kind);
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.projectile.respawn(behavior, position, velocity);
                slot.active = true;
                index
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    active: true,
                    projectile: Projectile::new(behavior, position, velocity),
                });
                index
            }
        };
        self.active.insert(index);

        let handle = ProjectileHandle {
            index,
            generation: self.slots[index as usize].generation,
        };
        log::trace!("Spawned {} as {:?}", kind.as_str(), handle);
        handle
    }

    /// Deactivate a projectile and put its slot on the free-list.
    ///
    /// Handles that are not currently active are reported and leave the pool
    /// untouched.
    pub fn despawn(&mut self, handle: ProjectileHandle) -> Result<(), PoolError> {
        if let Err(err) = self.check(handle) {
            log::warn!("Attempted to despawn a projectile that is not active: {err}");
            return Err(err);
        }
        self.release(handle.index);
        Ok(())
    }

    fn check(&self, handle: ProjectileHandle) -> Result<(), PoolError> {
        let slot = self
            .slots
            .get(handle.index as usize)
            .ok_or(PoolError::UnknownHandle(handle))?;
        if slot.generation != handle.generation {
            return Err(PoolError::StaleHandle(handle));
        }
        if !slot.active {
            return Err(PoolError::NotActive(handle));
        }
        Ok(())
    }

    /// Move an active slot to the free-list. Caller guarantees it is active.
    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.projectile.body_mut().destroy();
        self.active.remove(&index);
        self.free.push(index);
    }

    pub fn is_active(&self, handle: ProjectileHandle) -> bool {
        self.check(handle).is_ok()
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.check(handle).ok()?;
        Some(&self.slots[handle.index as usize].projectile)
    }

    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.check(handle).ok()?;
        Some(&mut self.slots[handle.index as usize].projectile)
    }

    /// Snapshot of an active projectile for the other side of a collision
    pub fn contact(&self, handle: ProjectileHandle) -> Option<ProjectileContact> {
        self.get(handle).map(|p| p.contact(handle))
    }

    fn handle_at(&self, index: u32) -> ProjectileHandle {
        ProjectileHandle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Active handles in slot order
    pub fn handles(&self) -> impl Iterator<Item = ProjectileHandle> + '_ {
        self.active.iter().map(|&index| self.handle_at(index))
    }

    /// Active projectiles in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> + '_ {
        self.active
            .iter()
            .map(|&index| (self.handle_at(index), &self.slots[index as usize].projectile))
    }

    /// Every slot, active or not, with its activity flag
    pub fn slots(&self) -> impl Iterator<Item = (u32, bool, &Projectile)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (i as u32, slot.active, &slot.projectile))
    }

    /// Number of active projectiles
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of slots waiting on the free-list
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Advance every active projectile and reclaim the ones that died
    pub fn tick(&mut self, dt: f32) {
        let handles: Vec<ProjectileHandle> = self.handles().collect();
        for handle in handles {
            let projectile = &mut self.slots[handle.index as usize].projectile;
            projectile.advance(dt);
            if !projectile.exists() {
                self.release(handle.index);
            }
        }
    }

    /// Deliver a collision to an active projectile.
    ///
    /// Returns false if the handle is no longer active (nothing is delivered).
    pub fn handle_collision(&mut self, handle: ProjectileHandle, other: &CollisionOther) -> bool {
        let Some(projectile) = self.get_mut(handle) else {
            log::debug!("Dropping collision for inactive projectile {:?}", handle);
            return false;
        };
        projectile.handle_collision(other);
        if !projectile.exists() {
            self.release(handle.index);
        }
        true
    }

    /// Verify that active and free slots partition the pool
    pub fn check_invariants(&self) -> bool {
        let mut seen = vec![false; self.slots.len()];
        for &index in &self.free {
            let i = index as usize;
            if i >= seen.len() || seen[i] || self.slots[i].active {
                return false;
            }
            seen[i] = true;
        }
        for &index in &self.active {
            let i = index as usize;
            if i >= seen.len() || seen[i] || !self.slots[i].active {
                return false;
            }
            if !self.slots[i].projectile.exists() {
                return false;
            }
            seen[i] = true;
        }
        seen.into_iter().all(|s| s)
    }
}
