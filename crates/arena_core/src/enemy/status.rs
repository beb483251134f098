//! Status-effect engine.
//!
//! Each enemy carries one [`EnemyStatus`] ledger holding at most one live
//! effect per [`StatusKind`]. Re-applying a kind overwrites the existing
//! entry (fresh duration, fresh damage, tick timer reset) instead of adding
//! a second instance.
//!
//! # Tick rule
//!
//! Every update adds `delta` to each effect's tick timer. When the timer
//! strictly exceeds the tick interval it resets to zero and, if the effect
//! carries damage, one damage tick is emitted. The remaining duration is
//! then reduced by `delta`, and the effect is removed in the same update
//! where the duration first reaches zero or below. With a 500 ms interval,
//! a 1000 ms burn updated in 500 ms steps therefore deals exactly one tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// Status effect types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Fire damage over time.
    Burn,
    /// Damage over time that spreads on death.
    Poison,
    /// Slows movement.
    Freeze,
    /// Prevents movement.
    Stun,
    /// Bleed damage over time.
    Bleed,
}

impl StatusKind {
    /// Parse a free-form effect name (case-insensitive).
    ///
    /// `"none"` and unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "burn" => Some(Self::Burn),
            "poison" => Some(Self::Poison),
            "freeze" => Some(Self::Freeze),
            "stun" => Some(Self::Stun),
            "bleed" => Some(Self::Bleed),
            "none" | "" => None,
            other => {
                tracing::warn!(effect = other, "Unknown status effect ignored");
                None
            }
        }
    }
}

/// A request to apply an effect: the elemental payload of a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusApplication {
    /// Effect type.
    pub kind: StatusKind,
    /// Damage per tick.
    #[serde(with = "decimal_serde", default)]
    pub damage: Fixed,
    /// Duration in ms; zero or negative means the configured default.
    #[serde(with = "decimal_serde", default)]
    pub duration: Fixed,
}

/// Tunables of the status engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSettings {
    /// Interval between damage ticks, ms.
    #[serde(with = "decimal_serde")]
    pub tick_interval: Fixed,
    /// Speed factor while frozen.
    #[serde(with = "decimal_serde")]
    pub freeze_factor: Fixed,
    /// Speed factor while enraged.
    #[serde(with = "decimal_serde")]
    pub enrage_factor: Fixed,
    /// Duration used when an application carries none, ms.
    #[serde(with = "decimal_serde")]
    pub default_duration: Fixed,
    /// Radius of the poison spread on death.
    #[serde(with = "decimal_serde")]
    pub poison_spread_radius: Fixed,
    /// Damage per tick of spread poison.
    #[serde(with = "decimal_serde")]
    pub poison_spread_damage: Fixed,
    /// Duration of spread poison, ms.
    #[serde(with = "decimal_serde")]
    pub poison_spread_duration: Fixed,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            tick_interval: Fixed::from_num(500),
            freeze_factor: Fixed::from_num(0.4),
            enrage_factor: Fixed::from_num(1.5),
            default_duration: Fixed::from_num(1000),
            poison_spread_radius: Fixed::from_num(150),
            poison_spread_damage: Fixed::ONE,
            poison_spread_duration: Fixed::from_num(2000),
        }
    }
}

impl StatusSettings {
    /// The poison application handed to neighbours of a poisoned corpse.
    #[must_use]
    pub fn spread_poison(&self) -> StatusApplication {
        StatusApplication {
            kind: StatusKind::Poison,
            damage: self.poison_spread_damage,
            duration: self.poison_spread_duration,
        }
    }
}

/// One live effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEffect {
    /// Time accumulated toward the next damage tick.
    pub tick_timer: Fixed,
    /// Time left before removal.
    pub remaining: Fixed,
    /// Damage per tick.
    pub damage: Fixed,
}

/// Result of one ledger update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Damage ticks to apply, in kind order.
    pub damage: Vec<(StatusKind, Fixed)>,
    /// Effects removed during this update.
    pub expired: Vec<StatusKind>,
}

/// Per-enemy effect ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyStatus {
    effects: BTreeMap<StatusKind, StatusEffect>,
    enraged: bool,
}

impl EnemyStatus {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the effect of `application.kind`.
    ///
    /// Returns the application as stored (default duration filled in).
    pub fn apply(&mut self, application: &StatusApplication, settings: &StatusSettings) -> StatusApplication {
        let duration = if application.duration > Fixed::ZERO {
            application.duration
        } else {
            settings.default_duration
        };
        let damage = application.damage.max(Fixed::ZERO);
        self.effects.insert(
            application.kind,
            StatusEffect {
                tick_timer: Fixed::ZERO,
                remaining: duration,
                damage,
            },
        );
        StatusApplication {
            kind: application.kind,
            damage,
            duration,
        }
    }

    /// Advance every effect by `delta`.
    pub fn update(&mut self, delta: Fixed, settings: &StatusSettings) -> StatusTick {
        let mut tick = StatusTick::default();

        for (kind, effect) in &mut self.effects {
            effect.tick_timer += delta;
            if effect.tick_timer > settings.tick_interval {
                effect.tick_timer = Fixed::ZERO;
                if effect.damage > Fixed::ZERO {
                    tick.damage.push((*kind, effect.damage));
                }
            }
            effect.remaining -= delta;
            if effect.remaining <= Fixed::ZERO {
                tick.expired.push(*kind);
            }
        }

        for kind in &tick.expired {
            self.effects.remove(kind);
        }
        tick
    }

    /// Live effect of a kind.
    #[must_use]
    pub fn effect(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.get(&kind)
    }

    /// Whether an effect of `kind` is live.
    #[must_use]
    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.contains_key(&kind)
    }

    /// Whether the enemy is stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.has(StatusKind::Stun)
    }

    /// Whether the enemy has entered enrage.
    #[must_use]
    pub const fn is_enraged(&self) -> bool {
        self.enraged
    }

    /// Number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Combined movement factor (freeze and enrage compose multiplicatively).
    #[must_use]
    pub fn speed_multiplier(&self, settings: &StatusSettings) -> Fixed {
        let mut multiplier = Fixed::ONE;
        if self.has(StatusKind::Freeze) {
            multiplier *= settings.freeze_factor;
        }
        if self.enraged {
            multiplier *= settings.enrage_factor;
        }
        multiplier
    }

    /// Enter enrage once health falls to `threshold` of max.
    ///
    /// One-way: returns `true` only on the call that triggers it.
    pub fn check_enrage(&mut self, health: Fixed, max_health: Fixed, threshold: Option<Fixed>) -> bool {
        let Some(threshold) = threshold else {
            return false;
        };
        if self.enraged || max_health <= Fixed::ZERO || threshold <= Fixed::ZERO {
            return false;
        }
        if health / max_health <= threshold {
            self.enraged = true;
            return true;
        }
        false
    }

    /// Drop every effect (used on death).
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn burn(damage: i32, duration: i32) -> StatusApplication {
        StatusApplication {
            kind: StatusKind::Burn,
            damage: ms(damage),
            duration: ms(duration),
        }
    }

    #[test]
    fn test_burn_scenario_single_tick() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        status.apply(&burn(5, 1000), &settings);

        let first = status.update(ms(500), &settings);
        assert!(first.damage.is_empty());

        let second = status.update(ms(500), &settings);
        assert_eq!(second.damage, vec![(StatusKind::Burn, ms(5))]);
        assert_eq!(second.expired, vec![StatusKind::Burn]);

        let third = status.update(ms(500), &settings);
        assert!(third.damage.is_empty());
        assert!(!status.has(StatusKind::Burn));
    }

    #[test]
    fn test_reapply_refreshes_instead_of_stacking() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        status.apply(&burn(5, 1000), &settings);
        status.update(ms(400), &settings);
        status.apply(&burn(8, 3000), &settings);

        assert_eq!(status.len(), 1);
        let effect = status.effect(StatusKind::Burn).unwrap();
        assert_eq!(effect.remaining, ms(3000));
        assert_eq!(effect.damage, ms(8));
        assert_eq!(effect.tick_timer, Fixed::ZERO);
    }

    #[test]
    fn test_missing_duration_uses_default() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        let stored = status.apply(&burn(1, 0), &settings);
        assert_eq!(stored.duration, ms(1000));
    }

    #[test]
    fn test_removed_exactly_when_duration_reaches_zero() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        status.apply(
            &StatusApplication {
                kind: StatusKind::Freeze,
                damage: Fixed::ZERO,
                duration: ms(300),
            },
            &settings,
        );
        assert!(status.update(ms(299), &settings).expired.is_empty());
        assert_eq!(status.update(ms(1), &settings).expired, vec![StatusKind::Freeze]);
    }

    #[test]
    fn test_speed_multiplier_composes() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        assert_eq!(status.speed_multiplier(&settings), Fixed::ONE);

        status.apply(
            &StatusApplication {
                kind: StatusKind::Freeze,
                damage: Fixed::ZERO,
                duration: ms(1000),
            },
            &settings,
        );
        assert!(status.check_enrage(ms(20), ms(100), Some(Fixed::from_num(0.3))));
        assert_eq!(
            status.speed_multiplier(&settings),
            settings.freeze_factor * settings.enrage_factor
        );
    }

    #[test]
    fn test_enrage_is_one_way() {
        let mut status = EnemyStatus::new();
        let threshold = Some(Fixed::from_num(0.5));
        assert!(!status.check_enrage(ms(80), ms(100), threshold));
        assert!(status.check_enrage(ms(50), ms(100), threshold));
        assert!(!status.check_enrage(ms(10), ms(100), threshold));
        assert!(status.is_enraged());
    }

    #[test]
    fn test_stun_membership() {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        assert!(!status.is_stunned());
        status.apply(
            &StatusApplication {
                kind: StatusKind::Stun,
                damage: Fixed::ZERO,
                duration: ms(100),
            },
            &settings,
        );
        assert!(status.is_stunned());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(StatusKind::parse("BURN"), Some(StatusKind::Burn));
        assert_eq!(StatusKind::parse("none"), None);
        assert_eq!(StatusKind::parse("sparkle"), None);
    }
}
