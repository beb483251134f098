//! Pooled ground pickups (XP gems, kits, chests).

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};
use crate::physics::{BodyHandle, BodyTag, PhysicsBackend};
use crate::pool::{ObjectPool, PoolHandle, Poolable};

/// Collection radius of a pickup body.
pub const PICKUP_RADIUS: i32 = 12;

/// Pickup types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PickupKind {
    /// Experience gem; value is the XP amount.
    #[default]
    XpGem,
    /// Restores player health.
    HealthKit,
    /// Pulls every gem toward the player.
    Magnet,
    /// Grants an item roll.
    TreasureChest,
}

/// Arguments for placing a pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupSpawn {
    /// Pickup type.
    pub kind: PickupKind,
    /// Position on the ground.
    pub position: Vec2Fixed,
    /// Pickup value.
    pub value: u32,
}

/// A pooled pickup.
#[derive(Debug, Clone, Default)]
pub struct Pickup {
    active: bool,
    kind: PickupKind,
    value: u32,
    /// Ground position.
    pub position: Vec2Fixed,
    /// Physics body owned by this pool slot.
    pub body: Option<BodyHandle>,
}

impl Poolable for Pickup {
    type Init = PickupSpawn;

    fn spawn(&mut self, init: PickupSpawn) {
        self.active = true;
        self.kind = init.kind;
        self.value = init.value;
        self.position = init.position;
    }

    fn reset(&mut self) {
        let body = self.body;
        *self = Self::default();
        self.body = body;
    }
}

impl Pickup {
    /// Whether the pickup can still be collected.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Pickup type.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        self.kind
    }

    /// Pickup value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Collect the pickup. Returns its type and value the first time only.
    pub fn collect(&mut self) -> Option<(PickupKind, u32)> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some((self.kind, self.value))
    }
}

/// Lease a pickup and give it a body.
pub fn place(pool: &mut ObjectPool<Pickup>, physics: &mut dyn PhysicsBackend, spawn: PickupSpawn) -> PoolHandle {
    let position = spawn.position;
    let radius = Fixed::from_num(PICKUP_RADIUS);
    let handle = pool.acquire(spawn);
    let tag = BodyTag::Pickup(handle);
    if let Some(pickup) = pool.get_mut(handle) {
        let body = match pickup.body {
            Some(body) => {
                physics.reset_body(body, tag, position, radius);
                body
            }
            None => physics.spawn_body(tag, position, radius),
        };
        pickup.body = Some(body);
    }
    handle
}

/// Return every collected pickup to the pool. Returns how many were recycled.
pub fn recycle(pool: &mut ObjectPool<Pickup>, physics: &mut dyn PhysicsBackend) -> usize {
    let collected: Vec<PoolHandle> = pool
        .iter_leased()
        .filter(|(_, pickup)| !pickup.is_active())
        .map(|(handle, _)| handle)
        .collect();
    for handle in &collected {
        if let Some(body) = pool.release(*handle).and_then(|pickup| pickup.body) {
            physics.set_enabled(body, false);
        }
    }
    collected.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::KinematicWorld;

    #[test]
    fn test_recycle_only_collected() {
        let mut world = KinematicWorld::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(500, 500));
        let mut pool = ObjectPool::<Pickup>::with_capacity(2);
        let spawn = |x| PickupSpawn {
            kind: PickupKind::HealthKit,
            position: Vec2Fixed::from_ints(x, 10),
            value: 0,
        };
        let kept = place(&mut pool, &mut world, spawn(10));
        let taken = place(&mut pool, &mut world, spawn(50));
        assert!(pool.get_mut(taken).and_then(Pickup::collect).is_some());

        assert_eq!(recycle(&mut pool, &mut world), 1);
        assert!(pool.is_live(kept));
        assert!(!pool.is_live(taken));
        assert_eq!(recycle(&mut pool, &mut world), 0);
    }

    #[test]
    fn test_collect_once() {
        let mut pickup = Pickup::default();
        pickup.spawn(PickupSpawn {
            kind: PickupKind::XpGem,
            position: Vec2Fixed::from_ints(5, 5),
            value: 20,
        });
        assert_eq!(pickup.collect(), Some((PickupKind::XpGem, 20)));
        assert_eq!(pickup.collect(), None);
    }
}
