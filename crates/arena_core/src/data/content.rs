//! Immutable content tables handed to a session at construction.

use serde::{Deserialize, Serialize};

use super::boss_data::BossConfig;
use super::enemy_data::EnemyConfig;
use super::structure_data::{DropItem, DropTable, StructureConfig};
use super::weapon_data::{WeaponConfig, WeaponType};
use crate::error::{ArenaError, Result};
use crate::math::Fixed;

/// Every template table a session reads from.
///
/// # Example RON
///
/// ```ron
/// ContentTables(
///     weapons: [...],
///     enemies: [...],
///     bosses: [...],
///     structures: [...],
///     drop_tables: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentTables {
    /// Weapon templates.
    pub weapons: Vec<WeaponConfig>,
    /// Enemy templates.
    pub enemies: Vec<EnemyConfig>,
    /// Boss definitions.
    pub bosses: Vec<BossConfig>,
    /// Structure templates.
    pub structures: Vec<StructureConfig>,
    /// Loot tables for structures.
    pub drop_tables: Vec<DropTable>,
}

fn parse<T: for<'de> Deserialize<'de>>(table: &str, text: &str) -> Result<T> {
    ron::from_str(text).map_err(|e| ArenaError::DataParseError {
        table: table.to_string(),
        message: e.to_string(),
    })
}

fn first_or_builtin<T: Clone>(table: &'static str, key: &str, entries: &[T], builtin: impl FnOnce() -> T) -> T {
    if let Some(first) = entries.first() {
        tracing::warn!(table, key, "Unknown key, falling back to first entry");
        first.clone()
    } else {
        tracing::warn!(table, key, "Unknown key and empty table, using built-in default");
        builtin()
    }
}

impl ContentTables {
    /// Parse a combined content file. Weapons are normalized on load.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let mut tables: Self = parse("content", text)?;
        tables.weapons = tables.weapons.into_iter().map(WeaponConfig::normalized).collect();
        Ok(tables)
    }

    /// Parse a weapons file (a RON list) and replace the weapon table.
    pub fn load_weapons(&mut self, text: &str) -> Result<()> {
        let weapons: Vec<WeaponConfig> = parse("weapons", text)?;
        self.weapons = weapons.into_iter().map(WeaponConfig::normalized).collect();
        Ok(())
    }

    /// Parse an enemies file and replace the enemy table.
    pub fn load_enemies(&mut self, text: &str) -> Result<()> {
        self.enemies = parse("enemies", text)?;
        Ok(())
    }

    /// Parse a bosses file and replace the boss table.
    pub fn load_bosses(&mut self, text: &str) -> Result<()> {
        self.bosses = parse("bosses", text)?;
        Ok(())
    }

    /// Parse a structures file and replace the structure table.
    pub fn load_structures(&mut self, text: &str) -> Result<()> {
        self.structures = parse("structures", text)?;
        Ok(())
    }

    /// Parse a drop-table file and replace the drop tables.
    pub fn load_drop_tables(&mut self, text: &str) -> Result<()> {
        self.drop_tables = parse("drop_tables", text)?;
        Ok(())
    }

    /// Find a weapon by key.
    #[must_use]
    pub fn find_weapon(&self, key: &str) -> Option<&WeaponConfig> {
        self.weapons.iter().find(|w| w.key == key)
    }

    /// Find an enemy by key.
    #[must_use]
    pub fn find_enemy(&self, key: &str) -> Option<&EnemyConfig> {
        self.enemies.iter().find(|e| e.key == key)
    }

    /// Find a boss by key.
    #[must_use]
    pub fn find_boss(&self, key: &str) -> Option<&BossConfig> {
        self.bosses.iter().find(|b| b.key == key)
    }

    /// Find a structure by key.
    #[must_use]
    pub fn find_structure(&self, key: &str) -> Option<&StructureConfig> {
        self.structures.iter().find(|s| s.key == key)
    }

    /// Find a drop table by key.
    #[must_use]
    pub fn find_drop_table(&self, key: &str) -> Option<&DropTable> {
        self.drop_tables.iter().find(|t| t.key == key)
    }

    /// Weapon by key, or a fallback (logged).
    #[must_use]
    pub fn weapon_or_fallback(&self, key: &str) -> WeaponConfig {
        self.find_weapon(key)
            .cloned()
            .unwrap_or_else(|| first_or_builtin("weapons", key, &self.weapons, WeaponConfig::fallback))
    }

    /// Enemy by key, or a fallback (logged).
    #[must_use]
    pub fn enemy_or_fallback(&self, key: &str) -> EnemyConfig {
        self.find_enemy(key)
            .cloned()
            .unwrap_or_else(|| first_or_builtin("enemies", key, &self.enemies, EnemyConfig::fallback))
    }

    /// Boss by key, or a fallback (logged).
    #[must_use]
    pub fn boss_or_fallback(&self, key: &str) -> BossConfig {
        self.find_boss(key).cloned().unwrap_or_else(|| {
            let base = self.enemies.first().map_or("fallback_enemy", |e| e.key.as_str());
            first_or_builtin("bosses", key, &self.bosses, || BossConfig::fallback(base))
        })
    }

    /// Structure by key, or a fallback (logged).
    #[must_use]
    pub fn structure_or_fallback(&self, key: &str) -> StructureConfig {
        self.find_structure(key)
            .cloned()
            .unwrap_or_else(|| first_or_builtin("structures", key, &self.structures, StructureConfig::fallback))
    }

    /// Strict weapon lookup for load-time callers.
    pub fn require_weapon(&self, key: &str) -> Result<&WeaponConfig> {
        self.find_weapon(key).ok_or_else(|| ArenaError::MissingConfig {
            table: "weapons",
            key: key.to_string(),
        })
    }

    /// Strict enemy lookup for load-time callers.
    pub fn require_enemy(&self, key: &str) -> Result<&EnemyConfig> {
        self.find_enemy(key).ok_or_else(|| ArenaError::MissingConfig {
            table: "enemies",
            key: key.to_string(),
        })
    }

    /// Check cross-references and value ranges.
    ///
    /// Returns every problem found; an empty list means the tables are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<ArenaError> {
        let mut errors = Vec::new();
        let invalid = |table: &'static str, key: &str, reason: String| ArenaError::InvalidContent {
            table,
            key: key.to_string(),
            reason,
        };

        duplicate_keys("weapons", self.weapons.iter().map(|w| w.key.as_str()), &mut errors);
        duplicate_keys("enemies", self.enemies.iter().map(|e| e.key.as_str()), &mut errors);
        duplicate_keys("bosses", self.bosses.iter().map(|b| b.key.as_str()), &mut errors);
        duplicate_keys("structures", self.structures.iter().map(|s| s.key.as_str()), &mut errors);
        duplicate_keys("drop_tables", self.drop_tables.iter().map(|t| t.key.as_str()), &mut errors);

        for weapon in &self.weapons {
            if weapon.cooldown_ms <= Fixed::ZERO {
                errors.push(invalid("weapons", &weapon.key, "cooldown must be positive".to_string()));
            }
            if weapon.damage < Fixed::ZERO {
                errors.push(invalid("weapons", &weapon.key, "damage must not be negative".to_string()));
            }
            if weapon.weapon_type == WeaponType::Trail && weapon.trail_lifetime() <= Fixed::ZERO {
                errors.push(invalid("weapons", &weapon.key, "trail lifetime must be positive".to_string()));
            }
        }

        for enemy in &self.enemies {
            if enemy.health <= Fixed::ZERO {
                errors.push(invalid("enemies", &enemy.key, "health must be positive".to_string()));
            }
            if enemy.xp_drop_chance < Fixed::ZERO || enemy.xp_drop_chance > Fixed::ONE {
                errors.push(invalid("enemies", &enemy.key, "xp_drop_chance must be within 0..1".to_string()));
            }
            if let Some(ranged) = &enemy.ranged_attack {
                if ranged.range <= Fixed::ZERO {
                    errors.push(invalid("enemies", &enemy.key, "ranged attack range must be positive".to_string()));
                }
            }
        }

        for boss in &self.bosses {
            if self.find_enemy(&boss.base_enemy).is_none() {
                errors.push(invalid(
                    "bosses",
                    &boss.key,
                    format!("unknown base enemy '{}'", boss.base_enemy),
                ));
            }
            if let Some(threshold) = boss.enrage_health_threshold {
                if threshold <= Fixed::ZERO || threshold >= Fixed::ONE {
                    errors.push(invalid("bosses", &boss.key, "enrage threshold must be within (0, 1)".to_string()));
                }
            }
        }

        for structure in &self.structures {
            if structure.max_hp <= Fixed::ZERO {
                errors.push(invalid("structures", &structure.key, "max_hp must be positive".to_string()));
            }
            if let Some(table) = &structure.drop_table {
                if self.find_drop_table(table).is_none() {
                    errors.push(invalid(
                        "structures",
                        &structure.key,
                        format!("unknown drop table '{table}'"),
                    ));
                }
            }
        }

        for table in &self.drop_tables {
            if table.entries.iter().any(|e| e.chance < Fixed::ZERO) {
                errors.push(invalid("drop_tables", &table.key, "chances must not be negative".to_string()));
            }
            if table.total_chance() > Fixed::ONE + Fixed::from_num(0.001) {
                errors.push(invalid("drop_tables", &table.key, "chances sum above 1".to_string()));
            }
            if table.entries.iter().all(|e| e.item == DropItem::Nothing) && !table.entries.is_empty() {
                tracing::debug!(table = %table.key, "Drop table never drops anything");
            }
        }

        errors
    }
}

fn duplicate_keys<'a>(table: &'static str, keys: impl Iterator<Item = &'a str>, errors: &mut Vec<ArenaError>) {
    let mut seen = std::collections::BTreeSet::new();
    for key in keys {
        if !seen.insert(key) {
            errors.push(ArenaError::InvalidContent {
                table,
                key: key.to_string(),
                reason: "duplicate key".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"(
        weapons: [
            (key: "sword", type: Melee, damage: 20, cooldown: 800),
            (key: "wand", type: Ranged, damage: 8, cooldown: 500, range: Some(300)),
        ],
        enemies: [
            (key: "grunt", health: 20, damage: 5, speed: 90),
        ],
        bosses: [
            (key: "king", base_enemy: "grunt"),
            (key: "orphan", base_enemy: "ghost"),
        ],
        structures: [
            (key: "crate_wood", max_hp: 50, drop_table: Some("common_structure")),
        ],
        drop_tables: [
            (key: "common_structure", entries: [(item: Nothing, chance: 1.0)]),
        ],
    )"#;

    #[test]
    fn test_load_normalizes_weapons() {
        let tables = ContentTables::from_ron_str(CONTENT).unwrap();
        let wand = tables.find_weapon("wand").unwrap();
        assert_eq!(wand.weapon_type, WeaponType::Trail);
        assert_eq!(wand.lifetime_ms, Some(Fixed::from_num(300)));
    }

    #[test]
    fn test_fallback_to_first_entry() {
        let tables = ContentTables::from_ron_str(CONTENT).unwrap();
        assert_eq!(tables.weapon_or_fallback("missing").key, "sword");
        assert_eq!(tables.enemy_or_fallback("missing").key, "grunt");
    }

    #[test]
    fn test_fallback_on_empty_table() {
        let tables = ContentTables::default();
        assert_eq!(tables.weapon_or_fallback("x").key, "fallback_weapon");
        assert_eq!(tables.boss_or_fallback("x").base_enemy, "fallback_enemy");
        assert!(matches!(
            tables.require_enemy("x"),
            Err(ArenaError::MissingConfig { table: "enemies", .. })
        ));
    }

    #[test]
    fn test_validate_reports_unknown_base_enemy() {
        let tables = ContentTables::from_ron_str(CONTENT).unwrap();
        let errors = tables.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("orphan"));
    }

    #[test]
    fn test_parse_error_names_table() {
        let err = ContentTables::from_ron_str("(weapons: [oops])").unwrap_err();
        assert!(matches!(err, ArenaError::DataParseError { ref table, .. } if table == "content"));
    }
}
