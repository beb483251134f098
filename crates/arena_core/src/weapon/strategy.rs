//! Strategy dispatch.

use crate::combat::CombatWorld;
use crate::data::{WeaponConfig, WeaponType};
use crate::math::{Fixed, Vec2Fixed};
use crate::roster::EntityId;

use super::melee::MeleeStrategy;
use super::trail::TrailStrategy;
use super::{CurrentStats, Wielder};

/// The enemy a weapon chose this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Enemy id.
    pub id: EntityId,
    /// Enemy position at selection time.
    pub position: Vec2Fixed,
}

/// Read-only inputs a strategy gets from its weapon.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Weapon template.
    pub config: &'a WeaponConfig,
    /// Stats resolved this tick.
    pub current: &'a CurrentStats,
    /// Character holding the weapon.
    pub wielder: &'a Wielder,
}

/// How a weapon attacks.
#[derive(Debug, Clone)]
pub enum WeaponStrategy {
    /// Short-lived overlap hitboxes.
    Melee(MeleeStrategy),
    /// Pooled travelling projectiles.
    Trail(TrailStrategy),
}

impl WeaponStrategy {
    /// Pick the strategy for a (normalized) template.
    #[must_use]
    pub fn for_config(config: &WeaponConfig) -> Self {
        match config.weapon_type {
            WeaponType::Melee => Self::Melee(MeleeStrategy::new()),
            WeaponType::Trail | WeaponType::Ranged => Self::Trail(TrailStrategy::new()),
        }
    }

    /// Execute one attack against `target`.
    pub fn attack(&mut self, target: Target, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        match self {
            Self::Melee(melee) => melee.attack(target, ctx, world),
            Self::Trail(trail) => trail.attack(target, ctx, world),
        }
    }

    /// Advance whatever the strategy keeps alive.
    pub fn update(&mut self, delta: Fixed, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        match self {
            Self::Melee(melee) => melee.update(delta, ctx, world),
            Self::Trail(trail) => trail.update(delta, world),
        }
    }

    /// Drop every live hitbox or trail.
    pub fn teardown(&mut self, world: &mut CombatWorld<'_>) {
        match self {
            Self::Melee(melee) => melee.teardown(world),
            Self::Trail(trail) => trail.teardown(world),
        }
    }

    /// Live hitboxes or trails.
    #[must_use]
    pub fn live_count(&self) -> usize {
        match self {
            Self::Melee(melee) => melee.live_hitboxes(),
            Self::Trail(trail) => trail.live_trails(),
        }
    }
}
