//! Test fixtures and helpers.
//!
//! Canned content tables and pre-populated arenas for consistent testing.
//! The content is the same RON shipped under `assets/data`, embedded at
//! compile time so tests never touch the filesystem.

use arena_core::arena::Arena;
use arena_core::config::ArenaConfig;
use arena_core::data::ContentTables;
use arena_core::math::Vec2Fixed;
use arena_core::roster::EntityId;
use fixed::types::I32F32;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const WEAPONS_RON: &str = include_str!("../../../assets/data/weapons.ron");
const ENEMIES_RON: &str = include_str!("../../../assets/data/enemies.ron");
const BOSSES_RON: &str = include_str!("../../../assets/data/bosses.ron");
const STRUCTURES_RON: &str = include_str!("../../../assets/data/structures.ron");
const DROP_TABLES_RON: &str = include_str!("../../../assets/data/drop_tables.ron");
const ARENA_RON: &str = include_str!("../../../assets/data/arena.ron");

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Integer position shorthand.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Seeded RNG matching the arena's generator.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Every shipped content table.
///
/// # Panics
///
/// Panics if the embedded RON fails to parse.
#[must_use]
pub fn canned_content() -> ContentTables {
    let mut content = ContentTables::default();
    content.load_weapons(WEAPONS_RON).expect("weapons.ron parses");
    content.load_enemies(ENEMIES_RON).expect("enemies.ron parses");
    content.load_bosses(BOSSES_RON).expect("bosses.ron parses");
    content.load_structures(STRUCTURES_RON).expect("structures.ron parses");
    content.load_drop_tables(DROP_TABLES_RON).expect("drop_tables.ron parses");
    tracing::debug!(
        weapons = content.weapons.len(),
        enemies = content.enemies.len(),
        bosses = content.bosses.len(),
        "Loaded canned content"
    );
    content
}

/// The shipped arena settings.
///
/// # Panics
///
/// Panics if the embedded RON fails to parse.
#[must_use]
pub fn canned_arena_config() -> ArenaConfig {
    ArenaConfig::from_ron_str(ARENA_RON).expect("arena.ron parses")
}

/// Canned arena with the given seed and nothing spawned.
#[must_use]
pub fn empty_arena(seed: u64) -> Arena {
    let config = ArenaConfig {
        seed,
        ..canned_arena_config()
    };
    Arena::new(config, canned_content())
}

/// Canned arena with weapons equipped and enemies placed.
#[must_use]
pub fn arena_with(seed: u64, weapons: &[&str], enemies: &[(&str, Vec2Fixed)]) -> Arena {
    let mut arena = empty_arena(seed);
    for key in weapons {
        arena.equip_weapon(key);
    }
    for (key, position) in enemies {
        arena.spawn_enemy(key, *position);
    }
    arena
}

/// A busy mixed encounter around the player spawn.
///
/// Sword and staff equipped, a ring of slimes, two archers, a snail, a
/// boss and a few breakable props.
#[must_use]
pub fn skirmish_arena(seed: u64) -> Arena {
    let mut arena = arena_with(seed, &["weapon_sword", "weapon_magic_staff", "weapon_venom_wand"], &[]);
    let center = arena.player().position;
    for i in 0..12 {
        let offset = Vec2Fixed::new(fixed((i % 4) * 70 - 105), fixed((i / 4) * 70 - 70));
        arena.spawn_enemy("enemy_slime", center + offset.scale(fixed(2)));
    }
    arena.spawn_enemy("enemy_archer", center + pos(350, 0));
    arena.spawn_enemy("enemy_archer", center + pos(-350, 120));
    arena.spawn_enemy("enemy_snail", center + pos(0, 260));
    arena.spawn_boss("boss_golem_king", center + pos(0, -400));
    for (i, key) in ["crate_wood", "barrel_explosive", "structure_crystal"].iter().enumerate() {
        let i = i32::try_from(i).unwrap_or_default();
        arena.spawn_structure(key, center + pos(-150 + i * 150, 150));
    }
    arena
}

/// Ids of every enemy still in the arena, in sorted order.
#[must_use]
pub fn enemy_ids(arena: &Arena) -> Vec<EntityId> {
    arena.enemies().sorted_ids()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::math::Fixed;

    #[test]
    fn test_fixed_helpers_match_core_alias() {
        let whole: Fixed = fixed(3);
        assert_eq!(whole, Fixed::from_num(3));
        assert_eq!(fixed_f(0.5) + fixed_f(0.5), Fixed::ONE);
        assert_eq!(pos(2, -1).x, fixed(2));
    }

    #[test]
    fn test_canned_content_validates() {
        let content = canned_content();
        assert!(content.validate().is_empty(), "{:?}", content.validate());
        assert!(content.find_weapon("weapon_sword").is_some());
        assert!(content.find_enemy("enemy_slime").is_some());
    }

    #[test]
    fn test_legacy_ranged_weapon_normalized() {
        let content = canned_content();
        let wand = content.find_weapon("weapon_venom_wand").expect("wand");
        assert!(!wand.is_melee());
        assert_eq!(wand.trail_speed(), fixed(500));
    }

    #[test]
    fn test_canned_config_matches_defaults_where_omitted() {
        let config = canned_arena_config();
        assert_eq!(config.projectile_lifetime, ArenaConfig::default().projectile_lifetime);
        assert_eq!(config.player.spawn, pos(1000, 1000));
    }

    #[test]
    fn test_skirmish_populates() {
        let arena = skirmish_arena(3);
        assert_eq!(arena.weapons().len(), 3);
        assert_eq!(enemy_ids(&arena).len(), 16);
        assert_eq!(arena.boss_flow().active_count(), 1);
        assert_eq!(arena.structures().len(), 3);
    }
}
