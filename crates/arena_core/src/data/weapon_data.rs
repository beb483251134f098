//! Weapon templates.

use serde::{Deserialize, Serialize};

use crate::enemy::{Knockback, StatusApplication, StatusKind};
use crate::math::{decimal_serde, option_decimal_serde, Fixed, MS_PER_SECOND};

/// Fallback trail lifetime, ms.
pub const DEFAULT_TRAIL_LIFETIME_MS: i32 = 2000;
/// Fallback trail speed, units per second.
pub const DEFAULT_TRAIL_SPEED: i32 = 500;
/// Fallback trail size.
pub const DEFAULT_TRAIL_SIZE: i32 = 10;
/// Fallback melee swing duration, ms.
pub const DEFAULT_MELEE_ANIM_MS: i32 = 250;

/// Attack family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    /// Hitbox swing around the player.
    Melee,
    /// Time-limited pooled trail aimed at a target.
    Trail,
    /// Legacy name for [`WeaponType::Trail`]; normalized at load time.
    Ranged,
}

/// Melee hitbox layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeleeBehavior {
    /// Rectangle in front of the player.
    #[default]
    FrontSwing,
    /// Square around the player.
    Area360,
    /// Long narrow rectangle in front.
    Thrust,
    /// Front rectangle, then a larger delayed wave.
    Wave,
}

/// Hitbox dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxSize {
    /// Width along the facing axis.
    #[serde(with = "decimal_serde")]
    pub width: Fixed,
    /// Height across the facing axis.
    #[serde(with = "decimal_serde")]
    pub height: Fixed,
}

impl HitboxSize {
    /// Build from integer dimensions.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: Fixed::from_num(width),
            height: Fixed::from_num(height),
        }
    }

    /// Scale both dimensions.
    #[must_use]
    pub fn scaled(self, factor: Fixed) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Immutable weapon template.
///
/// # Example RON
///
/// ```ron
/// (
///     key: "weapon_magic_staff",
///     type: Trail,
///     damage: 15,
///     cooldown: 1000,
///     lifetime_ms: Some(400),
///     trail_speed: Some(400),
///     elemental: Some(Freeze),
///     dot_duration_ms: 1500,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Unique key.
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Attack family.
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
    /// Base damage.
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,
    /// Base cooldown, ms.
    #[serde(with = "decimal_serde", alias = "cooldown")]
    pub cooldown_ms: Fixed,
    /// Knockback force.
    #[serde(with = "decimal_serde", default)]
    pub knockback: Fixed,
    /// Knockback duration, ms.
    #[serde(with = "decimal_serde", default = "default_knockback_duration")]
    pub knockback_duration_ms: Fixed,
    /// Explicit targeting range (melee). For legacy trail entries this is the lifetime.
    #[serde(with = "option_decimal_serde", default)]
    pub range: Option<Fixed>,

    /// Melee hitbox size (defaults to 200 × 100).
    #[serde(default)]
    pub melee_hitbox: Option<HitboxSize>,
    /// Melee swing duration, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub melee_anim_duration_ms: Option<Fixed>,
    /// Melee hitbox layout.
    #[serde(default)]
    pub melee_behavior: MeleeBehavior,
    /// Whether a front swing sits flush in front of the player.
    #[serde(default = "default_true")]
    pub frontal_attack: bool,
    /// Horizontal offset of a non-frontal front swing.
    #[serde(with = "option_decimal_serde", default)]
    pub melee_offset_x: Option<Fixed>,

    /// Trail lifetime, ms.
    #[serde(with = "option_decimal_serde", default)]
    pub lifetime_ms: Option<Fixed>,
    /// Trail travel speed, units per second.
    #[serde(with = "option_decimal_serde", default, alias = "projectile_speed")]
    pub trail_speed: Option<Fixed>,
    /// Trail size (spawn offset and collision radius).
    #[serde(with = "option_decimal_serde", default, alias = "projectile_size")]
    pub trail_size: Option<Fixed>,

    /// Elemental effect applied on hit.
    #[serde(default)]
    pub elemental: Option<StatusKind>,
    /// Base damage per elemental tick.
    #[serde(with = "decimal_serde", default)]
    pub dot_damage: Fixed,
    /// Elemental duration, ms.
    #[serde(with = "decimal_serde", default)]
    pub dot_duration_ms: Fixed,
}

fn default_knockback_duration() -> Fixed {
    Fixed::from_num(50)
}

const fn default_true() -> bool {
    true
}

impl WeaponConfig {
    /// Built-in template used when a table is empty.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            key: "fallback_weapon".to_string(),
            name: String::new(),
            weapon_type: WeaponType::Melee,
            damage: Fixed::from_num(10),
            cooldown_ms: Fixed::from_num(1000),
            knockback: Fixed::ZERO,
            knockback_duration_ms: default_knockback_duration(),
            range: None,
            melee_hitbox: None,
            melee_anim_duration_ms: None,
            melee_behavior: MeleeBehavior::FrontSwing,
            frontal_attack: true,
            melee_offset_x: None,
            lifetime_ms: None,
            trail_speed: None,
            trail_size: None,
            elemental: None,
            dot_damage: Fixed::ZERO,
            dot_duration_ms: Fixed::ZERO,
        }
    }

    /// Resolve legacy input: `Ranged` becomes `Trail` (with a warning) and a
    /// trail's `range` is read as its lifetime.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.weapon_type == WeaponType::Ranged {
            tracing::warn!(
                weapon = %self.key,
                "Weapon type 'Ranged' is deprecated, treating as 'Trail'"
            );
            self.weapon_type = WeaponType::Trail;
        }
        if self.weapon_type == WeaponType::Trail && self.lifetime_ms.is_none() {
            self.lifetime_ms = self.range.take();
        }
        self
    }

    /// Whether this is a melee weapon.
    #[must_use]
    pub fn is_melee(&self) -> bool {
        self.weapon_type == WeaponType::Melee
    }

    /// Melee hitbox size before area scaling.
    #[must_use]
    pub fn hitbox(&self) -> HitboxSize {
        self.melee_hitbox.unwrap_or_else(|| HitboxSize::new(200, 100))
    }

    /// Melee swing duration before attack speed scaling.
    #[must_use]
    pub fn melee_anim_duration(&self) -> Fixed {
        self.melee_anim_duration_ms
            .unwrap_or_else(|| Fixed::from_num(DEFAULT_MELEE_ANIM_MS))
    }

    /// Trail lifetime before area scaling.
    #[must_use]
    pub fn trail_lifetime(&self) -> Fixed {
        self.lifetime_ms
            .unwrap_or_else(|| Fixed::from_num(DEFAULT_TRAIL_LIFETIME_MS))
    }

    /// Trail speed before projectile speed scaling.
    #[must_use]
    pub fn trail_speed(&self) -> Fixed {
        self.trail_speed.unwrap_or_else(|| Fixed::from_num(DEFAULT_TRAIL_SPEED))
    }

    /// Trail size.
    #[must_use]
    pub fn trail_size(&self) -> Fixed {
        self.trail_size.unwrap_or_else(|| Fixed::from_num(DEFAULT_TRAIL_SIZE))
    }

    /// Targeting range before area scaling.
    ///
    /// Melee: explicit `range`, else the hitbox width. Trail: the distance
    /// the trail covers during its lifetime.
    #[must_use]
    pub fn base_range(&self) -> Fixed {
        if self.is_melee() {
            self.range.unwrap_or_else(|| self.hitbox().width)
        } else {
            self.trail_speed().saturating_mul(self.trail_lifetime()) / Fixed::from_num(MS_PER_SECOND)
        }
    }

    /// Knockback carried by hits.
    #[must_use]
    pub fn knockback(&self) -> Knockback {
        Knockback {
            force: self.knockback,
            duration: self.knockback_duration_ms,
        }
    }

    /// Elemental payload with the given (already scaled) tick damage.
    #[must_use]
    pub fn elemental_payload(&self, dot_damage: Fixed) -> Option<StatusApplication> {
        self.elemental.map(|kind| StatusApplication {
            kind,
            damage: dot_damage,
            duration: self.dot_duration_ms,
        })
    }
}
