//! Session configuration.
//!
//! Every field has a default, so an empty RON document `()` is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use crate::enemy::StatusSettings;
use crate::error::{ArenaError, Result};
use crate::math::{decimal_serde, Fixed, Vec2Fixed};
use crate::stats::ResolvedStats;

/// Player starting values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Spawn position.
    pub spawn: Vec2Fixed,
    /// Body radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Maximum health.
    #[serde(with = "decimal_serde")]
    pub max_health: Fixed,
    /// Movement speed, units per second.
    #[serde(with = "decimal_serde")]
    pub move_speed: Fixed,
    /// Damage multiplier.
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,
    /// Attack speed multiplier.
    #[serde(with = "decimal_serde")]
    pub attack_speed: Fixed,
    /// Area multiplier.
    #[serde(with = "decimal_serde")]
    pub area: Fixed,
    /// Projectile speed multiplier.
    #[serde(with = "decimal_serde")]
    pub projectile_speed: Fixed,
    /// Elemental damage multiplier.
    #[serde(with = "decimal_serde")]
    pub elemental_damage: Fixed,
    /// Crit probability.
    #[serde(with = "decimal_serde")]
    pub crit_chance: Fixed,
    /// Crit damage multiplier.
    #[serde(with = "decimal_serde")]
    pub critical_damage: Fixed,
    /// Knockback multiplier.
    #[serde(with = "decimal_serde")]
    pub knockback: Fixed,
    /// Minimum time between two contact hits, ms.
    #[serde(with = "decimal_serde")]
    pub contact_grace_ms: Fixed,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        let stats = ResolvedStats::default();
        Self {
            spawn: Vec2Fixed::from_ints(1000, 1000),
            radius: Fixed::from_num(16),
            max_health: stats.max_health,
            move_speed: stats.move_speed,
            damage: stats.damage,
            attack_speed: stats.attack_speed,
            area: stats.area,
            projectile_speed: stats.projectile_speed,
            elemental_damage: stats.elemental_damage,
            crit_chance: stats.crit_chance,
            critical_damage: stats.critical_damage,
            knockback: stats.knockback,
            contact_grace_ms: Fixed::from_num(500),
        }
    }
}

impl PlayerSettings {
    /// Stat bases for the player's pipeline.
    #[must_use]
    pub fn base_stats(&self) -> ResolvedStats {
        ResolvedStats {
            damage: self.damage,
            attack_speed: self.attack_speed,
            area: self.area,
            projectile_speed: self.projectile_speed,
            elemental_damage: self.elemental_damage,
            crit_chance: self.crit_chance,
            critical_damage: self.critical_damage,
            knockback: self.knockback,
            move_speed: self.move_speed,
            max_health: self.max_health,
        }
    }
}

/// Tunables for one arena session.
///
/// # Example RON
///
/// ```ron
/// ArenaConfig(
///     seed: 7,
///     world_max: (x: 1600, y: 1200),
///     status: (freeze_factor: 0.5),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Seed for crit and loot rolls.
    pub seed: u64,
    /// Lower world corner.
    pub world_min: Vec2Fixed,
    /// Upper world corner.
    pub world_max: Vec2Fixed,
    /// Margin used when clamping enemies after movement.
    #[serde(with = "decimal_serde")]
    pub clamp_margin: Fixed,
    /// Margin used when placing pickups.
    #[serde(with = "decimal_serde")]
    pub pickup_margin: Fixed,
    /// Status-effect tuning.
    pub status: StatusSettings,
    /// Chase/pause toggle interval of the default boss behavior, ms.
    #[serde(with = "decimal_serde")]
    pub boss_phase_interval: Fixed,
    /// Enemy projectile lifetime when the template names none, ms.
    #[serde(with = "decimal_serde")]
    pub projectile_lifetime: Fixed,
    /// Enemy projectile speed when the template names none.
    #[serde(with = "decimal_serde")]
    pub enemy_projectile_speed: Fixed,
    /// Enemy projectile radius when the template names none.
    #[serde(with = "decimal_serde")]
    pub enemy_projectile_radius: Fixed,
    /// Initial projectile pool size.
    pub projectile_pool_capacity: usize,
    /// Initial pickup pool size.
    pub pickup_pool_capacity: usize,
    /// Delay between a drop being rolled and the pickup appearing, ms.
    #[serde(with = "decimal_serde")]
    pub pickup_telegraph: Fixed,
    /// Player starting values.
    pub player: PlayerSettings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world_min: Vec2Fixed::ZERO,
            world_max: Vec2Fixed::from_ints(2000, 2000),
            clamp_margin: Fixed::from_num(10),
            pickup_margin: Fixed::from_num(30),
            status: StatusSettings::default(),
            boss_phase_interval: Fixed::from_num(3000),
            projectile_lifetime: Fixed::from_num(2000),
            enemy_projectile_speed: Fixed::from_num(200),
            enemy_projectile_radius: Fixed::from_num(5),
            projectile_pool_capacity: 30,
            pickup_pool_capacity: 20,
            pickup_telegraph: Fixed::from_num(1000),
            player: PlayerSettings::default(),
        }
    }
}

impl ArenaConfig {
    /// Parse from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ArenaError::DataParseError {
            table: "arena".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ArenaConfig::from_ron_str("()").unwrap(), ArenaConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ArenaConfig::from_ron_str("(seed: 9, status: (freeze_factor: 0.5), player: (crit_chance: 0.25))")
            .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.status.freeze_factor, Fixed::from_num(0.5));
        assert_eq!(config.status.tick_interval, Fixed::from_num(500));
        assert_eq!(config.player.crit_chance, Fixed::from_num(0.25));
        assert_eq!(config.player.max_health, Fixed::from_num(100));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ArenaConfig::from_ron_str("(seed: \"x\")"),
            Err(ArenaError::DataParseError { .. })
        ));
    }
}
