//! Destructible structures and their drop tables.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};
use crate::pickup::PickupKind;

/// Immutable structure template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Unique key.
    pub key: String,
    /// Hit points.
    #[serde(with = "decimal_serde")]
    pub max_hp: Fixed,
    /// Footprint diameter.
    #[serde(with = "decimal_serde", default = "default_size")]
    pub size: Fixed,
    /// Collision footprint as a fraction of `size`.
    #[serde(with = "decimal_serde", default = "default_hitbox_scale")]
    pub hitbox_scale: Fixed,
    /// Key of the drop table rolled on destruction.
    #[serde(default)]
    pub drop_table: Option<String>,
}

fn default_size() -> Fixed {
    Fixed::from_num(64)
}

fn default_hitbox_scale() -> Fixed {
    Fixed::ONE
}

impl StructureConfig {
    /// Built-in template used when the table is empty.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            key: "fallback_structure".to_string(),
            max_hp: Fixed::from_num(10),
            size: default_size(),
            hitbox_scale: default_hitbox_scale(),
            drop_table: None,
        }
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> Fixed {
        self.size * self.hitbox_scale / Fixed::from_num(2)
    }
}

/// What a drop-table entry yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropItem {
    /// No drop.
    Nothing,
    /// A pickup of the given kind.
    Pickup(PickupKind),
}

/// One weighted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Outcome.
    pub item: DropItem,
    /// Probability, 0..1.
    #[serde(with = "decimal_serde")]
    pub chance: Fixed,
    /// Pickup value (XP for gems).
    #[serde(default)]
    pub value: u32,
}

/// Weighted outcome list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTable {
    /// Unique key.
    pub key: String,
    /// Entries in roll order.
    pub entries: Vec<DropEntry>,
}

impl DropTable {
    /// Pick an outcome for a uniform sample in `[0, 1)`.
    ///
    /// Entries are walked in order, accumulating chances. A sample past the
    /// total yields nothing.
    #[must_use]
    pub fn roll(&self, sample: Fixed) -> Option<(PickupKind, u32)> {
        let mut cumulative = Fixed::ZERO;
        for entry in &self.entries {
            cumulative += entry.chance;
            if sample < cumulative {
                return match entry.item {
                    DropItem::Nothing => None,
                    DropItem::Pickup(kind) => Some((kind, entry.value)),
                };
            }
        }
        None
    }

    /// Sum of all chances.
    #[must_use]
    pub fn total_chance(&self) -> Fixed {
        self.entries.iter().map(|entry| entry.chance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> DropTable {
        ron::from_str(
            r#"(
                key: "common_structure",
                entries: [
                    (item: Nothing, chance: 0.6),
                    (item: Pickup(XpGem), chance: 0.3, value: 10),
                    (item: Pickup(HealthKit), chance: 0.1),
                ],
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn test_roll_walks_cumulative_chances() {
        let table = common();
        assert_eq!(table.roll(Fixed::from_num(0.1)), None);
        assert_eq!(table.roll(Fixed::from_num(0.65)), Some((PickupKind::XpGem, 10)));
        assert_eq!(table.roll(Fixed::from_num(0.95)), Some((PickupKind::HealthKit, 0)));
    }

    #[test]
    fn test_total_chance() {
        let total = common().total_chance();
        let epsilon = Fixed::from_num(0.0001);
        assert!((total - Fixed::ONE).abs() < epsilon);
    }
}
