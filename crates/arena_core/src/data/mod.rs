//! Content templates: weapons, enemies, bosses, structures and drop tables.
//!
//! This module contains pure data structures deserialized from RON. Nothing
//! here performs file IO; callers hand in already-loaded text.

mod boss_data;
mod content;
mod enemy_data;
mod structure_data;
mod weapon_data;

pub use boss_data::BossConfig;
pub use content::ContentTables;
pub use enemy_data::{
    BossTuning, EnemyConfig, EnemyProjectileConfig, RangedAttackConfig, TrailAttackConfig,
    DEFAULT_ENEMY_ATTACK_COOLDOWN,
};
pub use structure_data::{DropEntry, DropItem, DropTable, StructureConfig};
pub use weapon_data::{
    HitboxSize, MeleeBehavior, WeaponConfig, WeaponType, DEFAULT_MELEE_ANIM_MS, DEFAULT_TRAIL_LIFETIME_MS,
    DEFAULT_TRAIL_SIZE, DEFAULT_TRAIL_SPEED,
};
