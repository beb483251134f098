//! Arena tick benchmarks for arena_core.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use arena_core::arena::Arena;
use arena_core::config::ArenaConfig;
use arena_core::data::ContentTables;
use arena_core::math::{Fixed, Vec2Fixed};
use arena_test_utils::fixtures::canned_content;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn populated_arena(content: &ContentTables, enemies: i32) -> Arena {
    let mut arena = Arena::new(ArenaConfig { seed: 7, ..ArenaConfig::default() }, content.clone());
    arena.equip_weapon("weapon_sword");
    arena.equip_weapon("weapon_magic_staff");
    for i in 0..enemies {
        let angle_x = (i % 20) * 40 - 400;
        let angle_y = (i / 20) * 40 - 200;
        arena.spawn_enemy("enemy_slime", Vec2Fixed::from_ints(1000 + angle_x, 1000 + angle_y));
    }
    arena
}

/// One 16 ms tick of a populated arena.
pub fn arena_tick_benchmark(c: &mut Criterion) {
    let content = canned_content();
    let delta = Fixed::from_num(16);

    for count in [50, 200] {
        c.bench_function(&format!("arena_tick_{count}_enemies"), |b| {
            b.iter_batched(
                || populated_arena(&content, count),
                |mut arena| black_box(arena.tick(delta)),
                BatchSize::LargeInput,
            );
        });
    }

    c.bench_function("arena_120_ticks", |b| {
        b.iter_batched(
            || populated_arena(&content, 100),
            |mut arena| {
                for _ in 0..120 {
                    black_box(arena.tick(delta));
                }
                arena.state_hash()
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, arena_tick_benchmark);
criterion_main!(benches);
