//! Equipped weapons.
//!
//! A [`Weapon`] owns its template, the stats derived from it this tick, a
//! cooldown accumulator and the [`WeaponStrategy`] that carries out attacks.
//! Each update runs in a fixed order:
//!
//! 1. advance the cooldown accumulator,
//! 2. resolve current stats from the template and the wielder's stats,
//! 3. pick the nearest live enemy strictly inside range,
//! 4. attack if the accumulator reached the cooldown (then reset it to zero),
//! 5. let the strategy advance whatever it keeps alive (hitboxes, trails).

mod melee;
mod strategy;
mod trail;

pub use melee::{MeleeStrategy, AREA_360_RADIUS, THRUST_HITBOX, WAVE_PRIMARY_HITBOX, WAVE_SECONDARY_HITBOX};
pub use strategy::{StrategyContext, Target, WeaponStrategy};
pub use trail::TrailStrategy;

use rand::RngCore;

use crate::combat::CombatWorld;
use crate::data::WeaponConfig;
use crate::enemy::Enemy;
use crate::math::{unit_sample, Fixed, Vec2Fixed};
use crate::roster::{EntityId, Roster};
use crate::stats::ResolvedStats;

/// What a weapon sees of the character holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wielder {
    /// Character position.
    pub position: Vec2Fixed,
    /// Stats resolved for this tick.
    pub stats: ResolvedStats,
    /// Whether the character is alive.
    pub alive: bool,
}

/// Template values transformed by the wielder's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrentStats {
    /// Damage per hit before crits.
    pub damage: Fixed,
    /// Cooldown, ms.
    pub cooldown: Fixed,
    /// Trail lifetime, ms.
    pub lifetime: Fixed,
    /// Trail speed, units per second.
    pub trail_speed: Fixed,
    /// Elemental damage per tick.
    pub dot_damage: Fixed,
    /// Targeting range.
    pub range: Fixed,
}

impl CurrentStats {
    /// Resolve from a template and the wielder's stats.
    #[must_use]
    pub fn resolve(config: &WeaponConfig, stats: &ResolvedStats) -> Self {
        let cooldown = if stats.attack_speed > Fixed::ZERO {
            config.cooldown_ms / stats.attack_speed
        } else {
            config.cooldown_ms
        };
        Self {
            damage: config.damage * stats.damage,
            cooldown,
            lifetime: config.trail_lifetime() * stats.area,
            trail_speed: config.trail_speed() * stats.projectile_speed,
            dot_damage: config.dot_damage * stats.elemental_damage,
            range: config.base_range() * stats.area,
        }
    }
}

/// Roll one hit: a single uniform sample against the crit chance.
pub fn calculate_damage(damage: Fixed, stats: &ResolvedStats, rng: &mut impl RngCore) -> (Fixed, bool) {
    let is_critical = unit_sample(rng) < stats.crit_chance;
    if is_critical {
        (damage * stats.critical_damage, true)
    } else {
        (damage, false)
    }
}

/// Nearest live enemy strictly closer than `range`. Ties go to the lower id.
#[must_use]
pub fn find_nearest(enemies: &Roster<Enemy>, from: Vec2Fixed, range: Fixed) -> Option<Target> {
    let mut best: Option<(Fixed, Target)> = None;
    let limit = range.saturating_mul(range);
    for (id, enemy) in enemies.iter_sorted() {
        if !enemy.is_alive() {
            continue;
        }
        let dist_sq = from.distance_squared(enemy.position);
        let bound = best.as_ref().map_or(limit, |(d, _)| *d);
        if dist_sq < bound {
            best = Some((
                dist_sq,
                Target {
                    id,
                    position: enemy.position,
                },
            ));
        }
    }
    best.map(|(_, target)| target)
}

/// An equipped weapon.
#[derive(Debug, Clone)]
pub struct Weapon {
    config: WeaponConfig,
    current: CurrentStats,
    cooldown_timer: Fixed,
    strategy: WeaponStrategy,
    attacks: u64,
}

impl Weapon {
    /// Equip a weapon from its template.
    #[must_use]
    pub fn new(config: WeaponConfig) -> Self {
        let config = config.normalized();
        let strategy = WeaponStrategy::for_config(&config);
        Self {
            current: CurrentStats::default(),
            config,
            cooldown_timer: Fixed::ZERO,
            strategy,
            attacks: 0,
        }
    }

    /// Template key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Template.
    #[must_use]
    pub const fn config(&self) -> &WeaponConfig {
        &self.config
    }

    /// Stats resolved during the last update.
    #[must_use]
    pub const fn current(&self) -> &CurrentStats {
        &self.current
    }

    /// Time accumulated since the last attack, ms.
    #[must_use]
    pub const fn cooldown_timer(&self) -> Fixed {
        self.cooldown_timer
    }

    /// Attack strategy.
    #[must_use]
    pub const fn strategy(&self) -> &WeaponStrategy {
        &self.strategy
    }

    /// Attacks executed so far.
    #[must_use]
    pub const fn attacks(&self) -> u64 {
        self.attacks
    }

    /// Advance one tick. Returns the enemy attacked, if any.
    ///
    /// A dead wielder never attacks, but owned hitboxes and trails keep aging.
    pub fn update(&mut self, delta: Fixed, wielder: &Wielder, world: &mut CombatWorld<'_>) -> Option<EntityId> {
        self.cooldown_timer += delta;
        self.current = CurrentStats::resolve(&self.config, &wielder.stats);

        let ctx = StrategyContext {
            config: &self.config,
            current: &self.current,
            wielder,
        };

        let mut attacked = None;
        let target = if wielder.alive {
            find_nearest(world.enemies, wielder.position, self.current.range)
        } else {
            None
        };
        if let Some(target) = target {
            if self.cooldown_timer >= self.current.cooldown {
                self.strategy.attack(target, &ctx, world);
                self.cooldown_timer = Fixed::ZERO;
                self.attacks += 1;
                attacked = Some(target.id);
            }
        }

        self.strategy.update(delta, &ctx, world);
        attacked
    }

    /// Release everything the strategy still holds (unequip, end of run).
    pub fn unequip(&mut self, world: &mut CombatWorld<'_>) {
        self.strategy.teardown(world);
    }
}
