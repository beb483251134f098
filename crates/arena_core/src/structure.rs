//! Destructible structures (crates, barrels, rocks, crystals).

use crate::data::StructureConfig;
use crate::enemy::DamageOutcome;
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::BodyHandle;
use crate::roster::EntityId;

/// A placed structure.
#[derive(Debug, Clone)]
pub struct Structure {
    id: EntityId,
    config: StructureConfig,
    /// World position.
    pub position: Vec2Fixed,
    hp: Fixed,
    active: bool,
    /// Physics body.
    pub body: Option<BodyHandle>,
}

impl Structure {
    /// Place a structure at full hit points.
    #[must_use]
    pub fn new(id: EntityId, config: StructureConfig, position: Vec2Fixed) -> Self {
        let hp = if config.max_hp > Fixed::ZERO {
            config.max_hp
        } else {
            Fixed::from_num(10)
        };
        Self {
            id,
            config: StructureConfig { max_hp: hp, ..config },
            position,
            hp,
            active: true,
            body: None,
        }
    }

    /// Roster id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Template key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Template.
    #[must_use]
    pub const fn config(&self) -> &StructureConfig {
        &self.config
    }

    /// Hit points left.
    #[must_use]
    pub const fn hp(&self) -> Fixed {
        self.hp
    }

    /// Whether the structure still stands.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> Fixed {
        self.config.radius()
    }

    /// Subtract hit points while standing.
    pub fn take_damage(&mut self, amount: Fixed) -> DamageOutcome {
        if !self.active || amount <= Fixed::ZERO {
            return DamageOutcome::Ignored;
        }
        self.hp -= amount;
        if self.hp <= Fixed::ZERO {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Knock the structure down. Returns `true` only on the first call.
    pub fn die(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_wood() -> Structure {
        let config = StructureConfig {
            key: "crate_wood".to_string(),
            max_hp: Fixed::from_num(50),
            drop_table: Some("common_structure".to_string()),
            ..StructureConfig::fallback()
        };
        Structure::new(3, config, Vec2Fixed::from_ints(40, 40))
    }

    #[test]
    fn test_destroyed_once() {
        let mut s = crate_wood();
        assert_eq!(s.take_damage(Fixed::from_num(20)), DamageOutcome::Damaged);
        assert_eq!(s.hp(), Fixed::from_num(30));
        assert_eq!(s.take_damage(Fixed::from_num(30)), DamageOutcome::Killed);
        assert!(s.die());
        assert!(!s.die());
        assert_eq!(s.take_damage(Fixed::from_num(5)), DamageOutcome::Ignored);
    }

    #[test]
    fn test_non_positive_max_hp_defaults() {
        let config = StructureConfig {
            max_hp: Fixed::ZERO,
            ..StructureConfig::fallback()
        };
        let s = Structure::new(1, config, Vec2Fixed::ZERO);
        assert_eq!(s.hp(), Fixed::from_num(10));
    }
}
