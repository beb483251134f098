//! Enemy templates.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, option_decimal_serde, Fixed};

/// Cooldown after an enemy attack when the template names none, ms.
pub const DEFAULT_ENEMY_ATTACK_COOLDOWN: i32 = 2000;

/// Projectile or hazard fired by an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyProjectileConfig {
    /// Travel speed; the arena default applies when absent.
    #[serde(with = "option_decimal_serde")]
    pub speed: Option<Fixed>,
    /// Damage override; the enemy's own damage applies when absent.
    #[serde(with = "option_decimal_serde")]
    pub damage: Option<Fixed>,
    /// Lifetime override, ms.
    #[serde(with = "option_decimal_serde")]
    pub lifetime_ms: Option<Fixed>,
    /// Collision radius override.
    #[serde(with = "option_decimal_serde")]
    pub radius: Option<Fixed>,
}

/// Telegraphed ranged attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedAttackConfig {
    /// Player must be closer than this to start a telegraph.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Cooldown after firing, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub cooldown_ms: Option<Fixed>,
    /// Telegraph length, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub telegraph_ms: Option<Fixed>,
    /// Projectile fired.
    #[serde(default)]
    pub projectile: EnemyProjectileConfig,
}

/// Stationary hazard dropped while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailAttackConfig {
    /// Cooldown after dropping, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub cooldown_ms: Option<Fixed>,
    /// Hazard dropped.
    #[serde(default)]
    pub projectile: EnemyProjectileConfig,
}

/// Boss-only tuning carried by a merged boss template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Health fraction at or below which the boss enrages.
    #[serde(with = "option_decimal_serde")]
    pub enrage_health_threshold: Option<Fixed>,
    /// Time between stomps, ms.
    #[serde(with = "option_decimal_serde")]
    pub stomp_interval_ms: Option<Fixed>,
}

/// Immutable enemy template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Unique key.
    pub key: String,
    /// Maximum health.
    #[serde(with = "decimal_serde")]
    pub health: Fixed,
    /// Contact damage.
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,
    /// Base speed, units per second.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Body diameter.
    #[serde(with = "decimal_serde", default = "default_size")]
    pub size: Fixed,
    /// XP granted by a dropped gem.
    #[serde(default)]
    pub xp_value: u32,
    /// Probability of dropping a gem, 0..1.
    #[serde(with = "decimal_serde", default)]
    pub xp_drop_chance: Fixed,
    /// Telegraphed ranged attack.
    #[serde(default)]
    pub ranged_attack: Option<RangedAttackConfig>,
    /// Hazard-dropping attack.
    #[serde(default)]
    pub trail_attack: Option<TrailAttackConfig>,
    /// Present on merged boss templates.
    #[serde(default)]
    pub boss: Option<BossTuning>,
}

fn default_size() -> Fixed {
    Fixed::from_num(32)
}

impl EnemyConfig {
    /// Built-in template used when a table is empty.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            key: "fallback_enemy".to_string(),
            health: Fixed::from_num(10),
            damage: Fixed::from_num(5),
            speed: Fixed::from_num(100),
            size: default_size(),
            xp_value: 1,
            xp_drop_chance: Fixed::ZERO,
            ranged_attack: None,
            trail_attack: None,
            boss: None,
        }
    }

    /// Whether the template has a ranged attack.
    #[must_use]
    pub fn can_shoot(&self) -> bool {
        self.ranged_attack.is_some()
    }

    /// Body radius.
    #[must_use]
    pub fn radius(&self) -> Fixed {
        self.size / Fixed::from_num(2)
    }

    /// Cooldown after an attack, if the template sets one.
    #[must_use]
    pub fn attack_cooldown(&self) -> Option<Fixed> {
        self.ranged_attack
            .and_then(|ranged| ranged.cooldown_ms)
            .or_else(|| self.trail_attack.and_then(|trail| trail.cooldown_ms))
            .filter(|cooldown| *cooldown > Fixed::ZERO)
    }

    /// Enrage threshold, bosses only.
    #[must_use]
    pub fn enrage_threshold(&self) -> Option<Fixed> {
        self.boss.and_then(|boss| boss.enrage_health_threshold)
    }
}
