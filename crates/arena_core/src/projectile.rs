//! Pooled projectiles and trail hazards.
//!
//! A projectile is leased from the session's [`ObjectPool`](crate::pool::ObjectPool)
//! by whoever fires it, lives while its elapsed lifetime has not exceeded
//! its budget and it has not hit anything, then goes back to the pool.

use crate::enemy::{Knockback, StatusApplication};
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::{BodyHandle, BodyTag, PhysicsBackend};
use crate::pool::{ObjectPool, PoolHandle, Poolable};

/// Side that fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Faction {
    /// Player weapons.
    #[default]
    Player,
    /// Enemy attacks.
    Enemy,
}

/// Everything needed to (re)initialize a pooled projectile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectileSpawn {
    /// Who fired it.
    pub faction: Faction,
    /// Spawn position.
    pub origin: Vec2Fixed,
    /// Velocity in units per second.
    pub velocity: Vec2Fixed,
    /// Damage on hit.
    pub damage: Fixed,
    /// Whether the damage roll was critical.
    pub is_critical: bool,
    /// Knockback of the firing weapon.
    pub knockback: Knockback,
    /// Knockback multiplier of the firing character.
    pub knockback_multiplier: Fixed,
    /// Status effect applied on hit.
    pub elemental: Option<StatusApplication>,
    /// Lifetime budget in ms.
    pub lifetime: Fixed,
    /// Collision radius.
    pub radius: Fixed,
}

/// Payload handed to the collision handler by [`Projectile::hit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectileHit {
    /// Who fired it.
    pub faction: Faction,
    /// Damage to apply.
    pub damage: Fixed,
    /// Whether the damage roll was critical.
    pub is_critical: bool,
    /// Knockback to apply, already scaled by the multiplier.
    pub knockback: Knockback,
    /// Status effect to apply.
    pub elemental: Option<StatusApplication>,
}

/// A pooled projectile or trail hazard.
#[derive(Debug, Clone, Default)]
pub struct Projectile {
    active: bool,
    faction: Faction,
    /// Last known position (synced from physics each tick).
    pub position: Vec2Fixed,
    velocity: Vec2Fixed,
    damage: Fixed,
    is_critical: bool,
    knockback: Knockback,
    knockback_multiplier: Fixed,
    elemental: Option<StatusApplication>,
    lifetime: Fixed,
    elapsed: Fixed,
    radius: Fixed,
    /// Physics body owned by this pool slot; survives across leases.
    pub body: Option<BodyHandle>,
}

impl Poolable for Projectile {
    type Init = ProjectileSpawn;

    fn spawn(&mut self, init: ProjectileSpawn) {
        self.active = true;
        self.faction = init.faction;
        self.position = init.origin;
        self.velocity = init.velocity;
        self.damage = init.damage;
        self.is_critical = init.is_critical;
        self.knockback = init.knockback;
        self.knockback_multiplier = init.knockback_multiplier;
        self.elemental = init.elemental;
        self.lifetime = init.lifetime;
        self.elapsed = Fixed::ZERO;
        self.radius = init.radius;
    }

    fn reset(&mut self) {
        let body = self.body;
        *self = Self::default();
        self.body = body;
    }
}

impl Projectile {
    /// Whether the projectile can still move and collide.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Who fired it.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2Fixed {
        self.velocity
    }

    /// Damage carried.
    #[must_use]
    pub const fn damage(&self) -> Fixed {
        self.damage
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> Fixed {
        self.radius
    }

    /// Elapsed lifetime in ms.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Lifetime left before expiry (never negative).
    #[must_use]
    pub fn remaining_lifetime(&self) -> Fixed {
        (self.lifetime - self.elapsed).max(Fixed::ZERO)
    }

    /// Advance the lifetime clock. Returns whether the projectile is still active.
    pub fn update(&mut self, delta: Fixed) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed > self.lifetime {
            self.active = false;
        }
        self.active
    }

    /// Resolve a hit. Only the first call on an active projectile yields a
    /// payload; the projectile is expired immediately afterwards.
    pub fn hit(&mut self) -> Option<ProjectileHit> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(ProjectileHit {
            faction: self.faction,
            damage: self.damage,
            is_critical: self.is_critical,
            knockback: self.knockback.scaled(self.knockback_multiplier),
            elemental: self.elemental.clone(),
        })
    }
}

/// Lease a projectile and put its body in motion.
///
/// The slot's body is re-purposed when it has one, so a warm pool never
/// creates new physics bodies.
pub fn launch(
    pool: &mut ObjectPool<Projectile>,
    physics: &mut dyn PhysicsBackend,
    spawn: ProjectileSpawn,
) -> PoolHandle {
    let (origin, velocity, radius) = (spawn.origin, spawn.velocity, spawn.radius);
    let handle = pool.acquire(spawn);
    let tag = BodyTag::Projectile(handle);
    if let Some(projectile) = pool.get_mut(handle) {
        let body = match projectile.body {
            Some(body) => {
                physics.reset_body(body, tag, origin, radius);
                body
            }
            None => physics.spawn_body(tag, origin, radius),
        };
        projectile.body = Some(body);
        physics.set_velocity(body, velocity);
    }
    handle
}

/// Release a lease and take its body out of the simulation.
///
/// Returns `false` for stale handles.
pub fn retire(pool: &mut ObjectPool<Projectile>, physics: &mut dyn PhysicsBackend, handle: PoolHandle) -> bool {
    match pool.release(handle) {
        Some(projectile) => {
            if let Some(body) = projectile.body {
                physics.set_enabled(body, false);
            }
            true
        }
        None => false,
    }
}
