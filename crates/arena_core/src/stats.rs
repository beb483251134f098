//! Stat pipeline: base values plus additive and multiplicative modifiers.
//!
//! Every combat number a character exposes (damage multiplier, attack
//! speed, area, crit chance...) is a [`Stat`] channel. Resolution is
//!
//! ```text
//! resolved = (base + Σ additive) × Π multiplicative
//! ```
//!
//! Additive modifiers are always summed before any multiplicative modifier
//! is applied, so the order in which modifiers were added never changes the
//! result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// Named stat channels a character can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKind {
    /// Weapon damage multiplier.
    Damage,
    /// Attack speed multiplier (divides weapon cooldowns).
    AttackSpeed,
    /// Area multiplier (hitbox size, trail lifetime, targeting range).
    Area,
    /// Projectile/trail travel speed multiplier.
    ProjectileSpeed,
    /// Damage-over-time multiplier for elemental payloads.
    ElementalDamage,
    /// Probability of a critical hit, 0..1.
    CritChance,
    /// Damage multiplier applied on a critical hit.
    CriticalDamage,
    /// Knockback force multiplier.
    Knockback,
    /// Movement speed in units per second.
    MoveSpeed,
    /// Maximum health.
    MaxHealth,
}

/// How a modifier composes with the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierOp {
    /// Summed with the base before multiplication.
    Additive,
    /// Multiplies the summed value.
    Multiplicative,
}

/// A single modifier contributed by some source (an upgrade, an item...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    /// Identifier of whatever granted this modifier.
    pub source: String,
    /// Composition rule.
    pub op: ModifierOp,
    /// Amount added, or factor multiplied.
    #[serde(with = "decimal_serde")]
    pub value: Fixed,
    /// Maximum number of stacks from the same source; unbounded when `None`.
    #[serde(default)]
    pub max_stacks: Option<u32>,
}

impl StatModifier {
    /// Create an additive modifier with unbounded stacking.
    #[must_use]
    pub fn additive(source: impl Into<String>, value: Fixed) -> Self {
        Self {
            source: source.into(),
            op: ModifierOp::Additive,
            value,
            max_stacks: None,
        }
    }

    /// Create a multiplicative modifier with unbounded stacking.
    #[must_use]
    pub fn multiplicative(source: impl Into<String>, factor: Fixed) -> Self {
        Self {
            source: source.into(),
            op: ModifierOp::Multiplicative,
            value: factor,
            max_stacks: None,
        }
    }

    /// Builder method to cap stacking from this source.
    #[must_use]
    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = Some(max_stacks);
        self
    }
}

/// One stat channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stat {
    base: Fixed,
    modifiers: Vec<StatModifier>,
}

impl Stat {
    /// Create a stat with no modifiers.
    #[must_use]
    pub fn new(base: Fixed) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    /// Base value (never mutated by modifiers).
    #[must_use]
    pub fn base(&self) -> Fixed {
        self.base
    }

    /// Number of modifiers currently contributed by `source`.
    #[must_use]
    pub fn stacks_from(&self, source: &str) -> u32 {
        let count = self.modifiers.iter().filter(|m| m.source == source).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Add a modifier. Returns `false` if the source is already at its stack cap.
    pub fn add(&mut self, modifier: StatModifier) -> bool {
        if let Some(cap) = modifier.max_stacks {
            if self.stacks_from(&modifier.source) >= cap {
                return false;
            }
        }
        self.modifiers.push(modifier);
        true
    }

    /// Remove every modifier contributed by `source`, returning how many were removed.
    pub fn remove_source(&mut self, source: &str) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.source != source);
        before - self.modifiers.len()
    }

    /// `(base + Σ additive) × Π multiplicative`.
    #[must_use]
    pub fn resolve(&self) -> Fixed {
        let summed = self
            .modifiers
            .iter()
            .filter(|m| m.op == ModifierOp::Additive)
            .fold(self.base, |acc, m| acc.saturating_add(m.value));

        self.modifiers
            .iter()
            .filter(|m| m.op == ModifierOp::Multiplicative)
            .fold(summed, |acc, m| acc.saturating_mul(m.value))
    }
}

/// Final combat numbers for one tick, resolved from a [`StatPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStats {
    /// Weapon damage multiplier.
    pub damage: Fixed,
    /// Attack speed multiplier.
    pub attack_speed: Fixed,
    /// Area multiplier.
    pub area: Fixed,
    /// Projectile speed multiplier.
    pub projectile_speed: Fixed,
    /// Elemental damage multiplier.
    pub elemental_damage: Fixed,
    /// Crit probability, 0..1.
    pub crit_chance: Fixed,
    /// Crit damage multiplier.
    pub critical_damage: Fixed,
    /// Knockback multiplier.
    pub knockback: Fixed,
    /// Movement speed.
    pub move_speed: Fixed,
    /// Maximum health.
    pub max_health: Fixed,
}

impl Default for ResolvedStats {
    fn default() -> Self {
        Self {
            damage: Fixed::ONE,
            attack_speed: Fixed::ONE,
            area: Fixed::ONE,
            projectile_speed: Fixed::ONE,
            elemental_damage: Fixed::ONE,
            crit_chance: Fixed::ZERO,
            critical_damage: Fixed::from_num(1.5),
            knockback: Fixed::ONE,
            move_speed: Fixed::from_num(200),
            max_health: Fixed::from_num(100),
        }
    }
}

/// All stat channels of one character.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatPipeline {
    stats: BTreeMap<StatKind, Stat>,
}

impl StatPipeline {
    /// Create a pipeline seeded from already-resolved base values.
    #[must_use]
    pub fn from_bases(bases: &ResolvedStats) -> Self {
        let mut pipeline = Self::default();
        pipeline.set_base(StatKind::Damage, bases.damage);
        pipeline.set_base(StatKind::AttackSpeed, bases.attack_speed);
        pipeline.set_base(StatKind::Area, bases.area);
        pipeline.set_base(StatKind::ProjectileSpeed, bases.projectile_speed);
        pipeline.set_base(StatKind::ElementalDamage, bases.elemental_damage);
        pipeline.set_base(StatKind::CritChance, bases.crit_chance);
        pipeline.set_base(StatKind::CriticalDamage, bases.critical_damage);
        pipeline.set_base(StatKind::Knockback, bases.knockback);
        pipeline.set_base(StatKind::MoveSpeed, bases.move_speed);
        pipeline.set_base(StatKind::MaxHealth, bases.max_health);
        pipeline
    }

    /// Replace the base value of a channel, keeping its modifiers.
    pub fn set_base(&mut self, kind: StatKind, base: Fixed) {
        self.stats.entry(kind).or_default().base = base;
    }

    /// Add a modifier to a channel. Returns `false` if its stack cap was reached.
    pub fn add_modifier(&mut self, kind: StatKind, modifier: StatModifier) -> bool {
        let accepted = self.stats.entry(kind).or_default().add(modifier);
        if !accepted {
            tracing::debug!(?kind, "Modifier rejected: source at max stacks");
        }
        accepted
    }

    /// Remove all modifiers granted by `source` on every channel.
    pub fn remove_source(&mut self, source: &str) -> usize {
        self.stats.values_mut().map(|s| s.remove_source(source)).sum()
    }

    /// Access a channel.
    #[must_use]
    pub fn stat(&self, kind: StatKind) -> Option<&Stat> {
        self.stats.get(&kind)
    }

    /// Resolve one channel; missing channels resolve to zero.
    #[must_use]
    pub fn resolve(&self, kind: StatKind) -> Fixed {
        self.stats.get(&kind).map_or(Fixed::ZERO, Stat::resolve)
    }

    /// Resolve every channel into a snapshot.
    #[must_use]
    pub fn resolve_all(&self) -> ResolvedStats {
        ResolvedStats {
            damage: self.resolve(StatKind::Damage),
            attack_speed: self.resolve(StatKind::AttackSpeed),
            area: self.resolve(StatKind::Area),
            projectile_speed: self.resolve(StatKind::ProjectileSpeed),
            elemental_damage: self.resolve(StatKind::ElementalDamage),
            crit_chance: self.resolve(StatKind::CritChance),
            critical_damage: self.resolve(StatKind::CriticalDamage),
            knockback: self.resolve(StatKind::Knockback),
            move_speed: self.resolve(StatKind::MoveSpeed),
            max_health: self.resolve(StatKind::MaxHealth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_resolve_additive_then_multiplicative() {
        let mut stat = Stat::new(f(10.0));
        stat.add(StatModifier::multiplicative("rage", f(2.0)));
        stat.add(StatModifier::additive("ring", f(5.0)));
        // (10 + 5) * 2
        assert_eq!(stat.resolve(), f(30.0));
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let mods = [
            StatModifier::additive("a", f(3.0)),
            StatModifier::multiplicative("b", f(1.5)),
            StatModifier::additive("c", f(-1.0)),
            StatModifier::multiplicative("d", f(2.0)),
        ];

        let mut forward = Stat::new(f(4.0));
        for m in mods.iter().cloned() {
            forward.add(m);
        }
        let mut backward = Stat::new(f(4.0));
        for m in mods.iter().rev().cloned() {
            backward.add(m);
        }

        assert_eq!(forward.resolve(), backward.resolve());
        assert_eq!(forward.resolve(), f(18.0));
    }

    #[test]
    fn test_max_stacks_caps_source() {
        let mut stat = Stat::new(f(1.0));
        let m = StatModifier::additive("crit_gem", f(0.1)).with_max_stacks(2);
        assert!(stat.add(m.clone()));
        assert!(stat.add(m.clone()));
        assert!(!stat.add(m));
        assert_eq!(stat.stacks_from("crit_gem"), 2);
    }

    #[test]
    fn test_unbounded_stacking_by_default() {
        let mut stat = Stat::new(f(1.0));
        for _ in 0..50 {
            assert!(stat.add(StatModifier::additive("dmg", f(0.2))));
        }
        assert_eq!(stat.stacks_from("dmg"), 50);
    }

    #[test]
    fn test_base_never_mutates() {
        let mut pipeline = StatPipeline::from_bases(&ResolvedStats::default());
        pipeline.add_modifier(StatKind::Damage, StatModifier::multiplicative("x", f(3.0)));
        assert_eq!(pipeline.stat(StatKind::Damage).unwrap().base(), Fixed::ONE);
        assert_eq!(pipeline.resolve(StatKind::Damage), f(3.0));
    }

    #[test]
    fn test_remove_source() {
        let mut pipeline = StatPipeline::from_bases(&ResolvedStats::default());
        pipeline.add_modifier(StatKind::Damage, StatModifier::additive("item", f(1.0)));
        pipeline.add_modifier(StatKind::Area, StatModifier::additive("item", f(1.0)));
        assert_eq!(pipeline.remove_source("item"), 2);
        assert_eq!(pipeline.resolve_all(), ResolvedStats::default());
    }
}
