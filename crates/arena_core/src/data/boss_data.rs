//! Boss definitions layered over a base enemy.

use serde::{Deserialize, Serialize};

use crate::data::enemy_data::{BossTuning, EnemyConfig, RangedAttackConfig, TrailAttackConfig};
use crate::enemy::BossBehaviorConfig;
use crate::math::{option_decimal_serde, Fixed};

/// A boss definition.
///
/// Spawning merges it over its base enemy: stats are multiplied (health ×10,
/// damage ×1.5, speed ×0.8, size ×1.5 unless overridden) and attacks named
/// here replace the base enemy's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Unique key.
    pub key: String,
    /// Key of the enemy template the boss is built from.
    pub base_enemy: String,
    /// Health multiplier.
    #[serde(with = "option_decimal_serde", default)]
    pub health_multiplier: Option<Fixed>,
    /// Damage multiplier.
    #[serde(with = "option_decimal_serde", default)]
    pub damage_multiplier: Option<Fixed>,
    /// Speed multiplier.
    #[serde(with = "option_decimal_serde", default)]
    pub speed_multiplier: Option<Fixed>,
    /// Size multiplier.
    #[serde(with = "option_decimal_serde", default)]
    pub size_multiplier: Option<Fixed>,
    /// Health fraction at or below which the boss enrages.
    #[serde(with = "option_decimal_serde", default)]
    pub enrage_health_threshold: Option<Fixed>,
    /// Time between stomps, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub stomp_interval_ms: Option<Fixed>,
    /// Movement/attack pattern.
    #[serde(default)]
    pub behavior: BossBehaviorConfig,
    /// Replaces the base enemy's ranged attack.
    #[serde(default)]
    pub ranged_attack: Option<RangedAttackConfig>,
    /// Replaces the base enemy's trail attack.
    #[serde(default)]
    pub trail_attack: Option<TrailAttackConfig>,
}

fn multiplier(value: Option<Fixed>, default: f64) -> Fixed {
    value
        .filter(|v| *v > Fixed::ZERO)
        .unwrap_or_else(|| Fixed::from_num(default))
}

impl BossConfig {
    /// Built-in definition used when the table is empty.
    #[must_use]
    pub fn fallback(base_enemy: &str) -> Self {
        Self {
            key: "fallback_boss".to_string(),
            base_enemy: base_enemy.to_string(),
            health_multiplier: None,
            damage_multiplier: None,
            speed_multiplier: None,
            size_multiplier: None,
            enrage_health_threshold: None,
            stomp_interval_ms: None,
            behavior: BossBehaviorConfig::default(),
            ranged_attack: None,
            trail_attack: None,
        }
    }

    /// Build the final enemy template for this boss.
    #[must_use]
    pub fn merge(&self, base: &EnemyConfig) -> EnemyConfig {
        EnemyConfig {
            key: self.key.clone(),
            health: base.health * multiplier(self.health_multiplier, 10.0),
            damage: base.damage * multiplier(self.damage_multiplier, 1.5),
            speed: base.speed * multiplier(self.speed_multiplier, 0.8),
            size: base.size * multiplier(self.size_multiplier, 1.5),
            xp_value: base.xp_value,
            xp_drop_chance: base.xp_drop_chance,
            ranged_attack: self.ranged_attack.or(base.ranged_attack),
            trail_attack: self.trail_attack.or(base.trail_attack),
            boss: Some(BossTuning {
                enrage_health_threshold: self.enrage_health_threshold,
                stomp_interval_ms: self.stomp_interval_ms,
            }),
        }
    }
}
