//! Enemy behavior, status effects and death processing.

use arena_core::arena::Arena;
use arena_core::enemy::{
    BehaviorAction, BehaviorContext, DamageOutcome, EnemyBehavior, EnemyStatus, StationaryBurst,
    StationaryBurstParams, StatusApplication, StatusKind, StatusSettings,
};
use arena_core::events::{CombatEvent, DamageSource};
use arena_core::math::{Fixed, Vec2Fixed};
use arena_core::roster::EntityId;
use arena_test_utils::determinism::strategies::{arb_delta, arb_status_application};
use arena_test_utils::fixtures::{arena_with, empty_arena, fixed, pos};
use proptest::prelude::*;

fn burst(shots: u32) -> EnemyBehavior {
    EnemyBehavior::StationaryBurst(StationaryBurst::new(StationaryBurstParams {
        pause_duration: fixed(2000),
        telegraph_duration: fixed(1000),
        fire_rate: fixed(100),
        shots_per_burst: shots,
        idle_speed: Fixed::ZERO,
    }))
}

fn context() -> BehaviorContext {
    BehaviorContext {
        position: pos(500, 500),
        player: Some(pos(800, 500)),
        attack_range: None,
    }
}

/// Feed `deltas` and return (telegraphs, shots).
fn drive(behavior: &mut EnemyBehavior, deltas: impl IntoIterator<Item = Fixed>) -> (usize, usize) {
    let mut actions = Vec::new();
    for delta in deltas {
        behavior.update(delta, &context(), &mut actions);
    }
    let telegraphs = actions
        .iter()
        .filter(|a| matches!(a, BehaviorAction::Telegraph(_)))
        .count();
    let shots = actions.iter().filter(|a| **a == BehaviorAction::Fire).count();
    (telegraphs, shots)
}

#[test]
fn test_three_shot_burst() {
    let mut behavior = burst(3);
    let (telegraphs, shots) = drive(&mut behavior, [fixed(2000), fixed(1000), fixed(300)]);
    assert_eq!(telegraphs, 1);
    assert_eq!(shots, 3);
    assert_eq!(behavior.state_name(), "burst/waiting");
}

#[test]
fn test_burst_in_one_large_frame() {
    let mut behavior = burst(3);
    let (telegraphs, shots) = drive(&mut behavior, [fixed(3300)]);
    assert_eq!((telegraphs, shots), (1, 3));
    assert_eq!(behavior.state_name(), "burst/waiting");
}

#[test]
fn test_burn_scenario() {
    let settings = StatusSettings::default();
    let mut status = EnemyStatus::new();
    status.apply(
        &StatusApplication {
            kind: StatusKind::Burn,
            damage: fixed(5),
            duration: fixed(1000),
        },
        &settings,
    );

    let ticks: Vec<_> = (0..3).map(|_| status.update(fixed(500), &settings)).collect();
    let total = ticks
        .iter()
        .flat_map(|t| t.damage.iter())
        .fold(Fixed::ZERO, |acc, (_, d)| acc + *d);
    assert_eq!(total, fixed(5));
    assert!(!status.has(StatusKind::Burn));
    assert!(ticks[2].damage.is_empty());
}

#[test]
fn test_freeze_and_stun_shape_movement() {
    let settings = StatusSettings::default();
    let mut arena = arena_with(1, &[], &[("enemy_slime", pos(1500, 1000))]);
    let slime = arena.enemies().sorted_ids()[0];

    arena.tick(fixed(100));
    let free_start = arena.enemies().get(slime).map(|e| e.position).unwrap_or_default();
    arena.tick(fixed(100));
    let free_step = free_start.x - arena.enemies().get(slime).map(|e| e.position.x).unwrap_or_default();

    assert!(arena.apply_status(
        slime,
        &StatusApplication {
            kind: StatusKind::Freeze,
            damage: Fixed::ZERO,
            duration: fixed(5000),
        },
    ));
    let frozen_start = arena.enemies().get(slime).map(|e| e.position).unwrap_or_default();
    arena.tick(fixed(100));
    let frozen_step = frozen_start.x - arena.enemies().get(slime).map(|e| e.position.x).unwrap_or_default();
    assert!(frozen_step < free_step);
    let expected = free_step * settings.freeze_factor;
    assert!((frozen_step - expected).abs() < fixed(1));

    assert!(arena.apply_status(
        slime,
        &StatusApplication {
            kind: StatusKind::Stun,
            damage: Fixed::ZERO,
            duration: fixed(5000),
        },
    ));
    let stunned_start = arena.enemies().get(slime).map(|e| e.position).unwrap_or_default();
    arena.tick(fixed(100));
    assert_eq!(arena.enemies().get(slime).map(|e| e.position), Some(stunned_start));
}

#[test]
fn test_poison_spreads_one_hop() {
    let mut arena = empty_arena(9);
    let source = arena.spawn_enemy("enemy_slime", pos(1500, 1500));
    let near = arena.spawn_enemy("enemy_slime", pos(1560, 1500));
    let close = arena.spawn_enemy("enemy_slime", pos(1500, 1600));
    let far = arena.spawn_enemy("enemy_slime", pos(1900, 1900));
    arena.tick(fixed(1));

    assert!(arena.apply_status(
        source,
        &StatusApplication {
            kind: StatusKind::Poison,
            damage: fixed(1),
            duration: fixed(5000),
        },
    ));
    assert_eq!(
        arena.damage_enemy(source, fixed(1000), DamageSource::Melee),
        DamageOutcome::Killed
    );

    let events = arena.tick(fixed(1));
    let spread: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::PoisonSpread { source: s, targets } => Some((*s, targets.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(spread, vec![(source, vec![near, close])]);

    let has_poison = |id| arena.enemies().get(id).is_some_and(|e| e.status().has(StatusKind::Poison));
    assert!(has_poison(near));
    assert!(has_poison(close));
    assert!(!has_poison(far));
    assert!(!arena.enemies().contains(source));
}

/// A slime that will not move for the rest of the test.
fn pinned_slime(arena: &mut Arena, x: i32, y: i32) -> EntityId {
    let id = arena.spawn_enemy("enemy_slime", pos(x, y));
    assert!(arena.apply_status(
        id,
        &StatusApplication {
            kind: StatusKind::Stun,
            damage: Fixed::ZERO,
            duration: fixed(60_000),
        },
    ));
    id
}

fn poison(arena: &mut Arena, id: EntityId) {
    assert!(arena.apply_status(
        id,
        &StatusApplication {
            kind: StatusKind::Poison,
            damage: fixed(1),
            duration: fixed(5000),
        },
    ));
}

fn spreads(events: &[CombatEvent]) -> Vec<(EntityId, Vec<EntityId>)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::PoisonSpread { source, targets } => Some((*source, targets.clone())),
            _ => None,
        })
        .collect()
}

fn is_poisoned(arena: &Arena, id: EntityId) -> bool {
    arena.enemies().get(id).is_some_and(|e| e.status().has(StatusKind::Poison))
}

#[test]
fn test_poison_spread_radius_is_exclusive() {
    let mut arena = empty_arena(9);
    let source = pinned_slime(&mut arena, 1500, 1500);
    let on_edge = pinned_slime(&mut arena, 1650, 1500);
    let inside = pinned_slime(&mut arena, 1500, 1649);
    poison(&mut arena, source);

    arena.damage_enemy(source, fixed(1000), DamageSource::Melee);
    let events = arena.tick(fixed(1));

    assert_eq!(spreads(&events), vec![(source, vec![inside])]);
    assert!(!is_poisoned(&arena, on_edge));
    assert!(is_poisoned(&arena, inside));
}

#[test]
fn test_clean_kill_spreads_nothing() {
    let mut arena = empty_arena(9);
    let source = pinned_slime(&mut arena, 1500, 1500);
    let left = pinned_slime(&mut arena, 1440, 1500);
    let right = pinned_slime(&mut arena, 1560, 1500);

    arena.damage_enemy(source, fixed(1000), DamageSource::Melee);
    let events = arena.tick(fixed(1));

    assert!(spreads(&events).is_empty());
    assert!(events.iter().all(|e| e.name() != "poison-spread"));
    assert!(!is_poisoned(&arena, left));
    assert!(!is_poisoned(&arena, right));
}

#[test]
fn test_lone_poisoned_kill_spreads_nothing() {
    let mut arena = empty_arena(9);
    let source = pinned_slime(&mut arena, 1500, 1500);
    let far = pinned_slime(&mut arena, 1900, 1900);
    poison(&mut arena, source);

    arena.damage_enemy(source, fixed(1000), DamageSource::Melee);
    let events = arena.tick(fixed(1));

    assert!(spreads(&events).is_empty());
    assert!(!is_poisoned(&arena, far));
    assert!(!arena.enemies().contains(source));
}

#[test]
fn test_poison_skips_neighbour_killed_same_tick() {
    let mut arena = empty_arena(9);
    let source = pinned_slime(&mut arena, 1500, 1500);
    let doomed = pinned_slime(&mut arena, 1560, 1500);
    let survivor = pinned_slime(&mut arena, 1500, 1560);
    poison(&mut arena, source);

    arena.damage_enemy(source, fixed(1000), DamageSource::Melee);
    arena.damage_enemy(doomed, fixed(1000), DamageSource::Melee);
    let events = arena.tick(fixed(1));

    assert_eq!(spreads(&events), vec![(source, vec![survivor])]);
    let poisoned_doomed = events.iter().any(|e| {
        matches!(e, CombatEvent::StatusApplied { enemy, kind: StatusKind::Poison, .. } if *enemy == doomed)
    });
    assert!(!poisoned_doomed);
    assert!(!arena.enemies().contains(doomed));
}

#[test]
fn test_dead_archer_never_fires_telegraphed_shot() {
    let mut arena = arena_with(4, &[], &[("enemy_archer", pos(1300, 1000))]);
    let archer = arena.enemies().sorted_ids()[0];

    let mut telegraphed = false;
    for _ in 0..400 {
        let events = arena.tick(fixed(16));
        if events.iter().any(|e| e.name() == "enemy-telegraph") {
            telegraphed = true;
            break;
        }
    }
    assert!(telegraphed);

    arena.damage_enemy(archer, fixed(1000), DamageSource::Melee);
    for _ in 0..100 {
        let events = arena.tick(fixed(16));
        assert!(events.iter().all(|e| e.name() != "enemy-shoot"));
    }
}

#[test]
fn test_boss_enrages_once() {
    let mut arena = empty_arena(2);
    let boss = arena.spawn_boss("boss_golem_king", pos(1400, 1400));
    let max = arena.enemies().get(boss).map(|e| e.max_health()).unwrap_or_default();

    arena.damage_enemy(boss, max * Fixed::from_num(0.75), DamageSource::Melee);
    arena.damage_enemy(boss, fixed(1), DamageSource::Melee);
    let events = arena.tick(fixed(16));
    assert_eq!(events.iter().filter(|e| e.name() == "boss-enraged").count(), 1);
    assert!(arena.enemies().get(boss).is_some_and(|e| e.status().is_enraged()));
}

#[test]
fn test_boss_death_queues_reward() {
    let mut arena = empty_arena(2);
    let boss = arena.spawn_boss("boss_golem_king", pos(1400, 1400));
    arena.tick(fixed(16));

    arena.damage_enemy(boss, fixed(100_000), DamageSource::Melee);
    let events = arena.tick(fixed(16));
    let names: Vec<_> = events.iter().map(CombatEvent::name).collect();
    assert!(names.contains(&"boss-died"));
    assert!(names.contains(&"boss-encounter-cleared"));
    assert_eq!(arena.take_boss_rewards(), 1);
    assert_eq!(arena.boss_flow().active_count(), 0);
}

proptest! {
    /// The burst fires the same number of shots however the time is sliced.
    #[test]
    fn prop_burst_is_frame_rate_independent(deltas in prop::collection::vec(arb_delta(), 1..200)) {
        let cycle = fixed(3300);
        let mut behavior = burst(3);
        let mut elapsed = Fixed::ZERO;
        let mut fed = Vec::new();
        for delta in deltas {
            if elapsed >= cycle {
                break;
            }
            elapsed += delta;
            fed.push(delta);
        }
        if elapsed < cycle {
            fed.push(cycle - elapsed);
        }

        let (telegraphs, shots) = drive(&mut behavior, fed);
        prop_assert_eq!(telegraphs, 1);
        prop_assert_eq!(shots, 3);
        prop_assert_eq!(behavior.state_name(), "burst/waiting");
    }

    /// Remaining duration strictly decreases and the effect leaves exactly
    /// when it first reaches zero.
    #[test]
    fn prop_status_duration_monotonic(
        application in arb_status_application(),
        deltas in prop::collection::vec(arb_delta(), 1..120),
    ) {
        let settings = StatusSettings::default();
        let mut status = EnemyStatus::new();
        status.apply(&application, &settings);
        let kind = application.kind;

        let mut previous = application.duration;
        for delta in deltas {
            let tick = status.update(delta, &settings);
            match status.effect(kind) {
                Some(effect) => {
                    prop_assert!(effect.remaining < previous);
                    prop_assert!(effect.remaining > Fixed::ZERO);
                    prop_assert_eq!(effect.remaining, previous - delta);
                    previous = effect.remaining;
                }
                None => {
                    prop_assert!(previous - delta <= Fixed::ZERO);
                    prop_assert_eq!(tick.expired, vec![kind]);
                    break;
                }
            }
        }
    }

    /// Enemy health never increases under damage.
    #[test]
    fn prop_enemy_health_non_increasing(hits in prop::collection::vec(0i32..60, 1..20)) {
        let mut arena = empty_arena(5);
        let id = arena.spawn_enemy("enemy_golem", Vec2Fixed::from_ints(1500, 1500));
        let mut last = arena.enemies().get(id).map(|e| e.health()).unwrap_or_default();
        for hit in hits {
            arena.damage_enemy(id, fixed(hit), DamageSource::Projectile);
            let Some(enemy) = arena.enemies().get(id) else { break };
            prop_assert!(enemy.health() <= last);
            last = enemy.health();
        }
    }
}
