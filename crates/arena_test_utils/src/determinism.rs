//! Determinism testing utilities.
//!
//! Provides a harness for verifying that an arena produces identical results
//! given identical inputs: same seed, same content, same tick deltas.
//!
//! # Testing Strategy
//!
//! Replays, balance sweeps and regression captures all assume a session is a
//! pure function of its seed. Sources of non-determinism include:
//!
//! - **Floating-point math**: We use fixed-point arithmetic via
//!   [`arena_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Rosters always iterate in sorted entity ID order.
//!
//! - **Conditional RNG draws**: A roll skipped on one path shifts every
//!   later roll. Loot and crit rolls always draw.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual components (status ticks, behaviors, pools)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full arena scenarios are reproducible
//! 4. **Parallel tests**: Running N arenas on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::arena::Arena;
use arena_core::events::CombatEvent;
use arena_core::math::Fixed;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the arena was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Arena is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel arena runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each arena.
    pub hashes: Vec<u64>,
    /// Number of ticks each arena ran.
    pub ticks: u64,
    /// Number of arenas run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all arenas produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all arenas matched.
    ///
    /// # Panics
    ///
    /// Panics if arenas produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel arenas diverged!\n\
                 Arenas: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use arena_test_utils::determinism::verify_determinism;
/// use arena_test_utils::fixtures::skirmish_arena;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 ticks each
///     || skirmish_arena(42),
///     |arena| { arena.tick(Fixed::from_num(16)); },
///     |arena| arena.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run an arena twice with identical setup and compare final state hashes
/// and the hash of the full event log.
pub fn verify_arena_determinism<F>(setup_fn: F, delta: Fixed, num_ticks: u64) -> bool
where
    F: Fn() -> Arena,
{
    let (state_a, log_a) = run_recorded(&setup_fn, delta, num_ticks);
    let (state_b, log_b) = run_recorded(&setup_fn, delta, num_ticks);
    state_a == state_b && log_a == log_b
}

/// Tick an arena and return `(state_hash, event_log_hash)`.
pub fn run_recorded<F>(setup_fn: &F, delta: Fixed, num_ticks: u64) -> (u64, u64)
where
    F: Fn() -> Arena,
{
    let mut arena = setup_fn();
    let mut log = DefaultHasher::new();
    for _ in 0..num_ticks {
        hash_events(&arena.tick(delta), &mut log);
    }
    (arena.state_hash(), log.finish())
}

/// Fold a batch of events into `hasher`.
///
/// Events carry fixed-point payloads whose `Debug` output is exact, so the
/// formatted text is a faithful fingerprint.
pub fn hash_events(events: &[CombatEvent], hasher: &mut impl Hasher) {
    events.len().hash(hasher);
    for event in events {
        format!("{event:?}").hash(hasher);
    }
}

/// Run N arenas on scoped threads and collect final hashes.
///
/// Each arena is built on its own thread: event subscribers are not `Send`,
/// so arenas never cross threads.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_arenas<F>(
    setup_fn: F,
    num_sims: usize,
    delta: Fixed,
    num_ticks: u64,
) -> ParallelSimResult
where
    F: Fn() -> Arena + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut arena = setup_fn();
                    for _ in 0..num_ticks {
                        arena.tick(delta);
                    }
                    arena.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("arena thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two arena runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(tick)` for the first tick where the
/// state hash or that tick's events differ.
pub fn find_first_divergence<F>(setup_fn: F, delta: Fixed, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Arena,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let events_a = first.tick(delta);
        let events_b = second.tick(delta);

        if events_a != events_b || first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for arena testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use arena_core::enemy::{StatusApplication, StatusKind};
    use arena_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Coordinate inside the default 2000x2000 arena.
    pub fn arb_coordinate() -> impl Strategy<Value = Fixed> {
        (0i32..2000i32).prop_map(Fixed::from_num)
    }

    /// Position inside the default arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Tick delta in milliseconds (1 to 100).
    pub fn arb_delta() -> impl Strategy<Value = Fixed> {
        (1i32..=100i32).prop_map(Fixed::from_num)
    }

    /// A run of tick deltas.
    pub fn arb_delta_sequence(max_len: usize) -> impl Strategy<Value = Vec<Fixed>> {
        prop::collection::vec(arb_delta(), 1..=max_len)
    }

    /// Health pool.
    pub fn arb_health() -> impl Strategy<Value = Fixed> {
        (1i32..=1000i32).prop_map(Fixed::from_num)
    }

    /// Damage amount.
    pub fn arb_damage() -> impl Strategy<Value = Fixed> {
        (0i32..=200i32).prop_map(Fixed::from_num)
    }

    /// Weapon cooldown in milliseconds.
    pub fn arb_cooldown() -> impl Strategy<Value = Fixed> {
        (50i32..=3000i32).prop_map(Fixed::from_num)
    }

    /// Any status kind.
    pub fn arb_status_kind() -> impl Strategy<Value = StatusKind> {
        prop_oneof![
            Just(StatusKind::Burn),
            Just(StatusKind::Poison),
            Just(StatusKind::Freeze),
            Just(StatusKind::Stun),
            Just(StatusKind::Bleed),
        ]
    }

    /// A status application with a positive duration.
    pub fn arb_status_application() -> impl Strategy<Value = StatusApplication> {
        (arb_status_kind(), 0i32..=10i32, 100i32..=5000i32).prop_map(|(kind, damage, duration)| {
            StatusApplication {
                kind,
                damage: Fixed::from_num(damage),
                duration: Fixed::from_num(duration),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{arena_with, pos, skirmish_arena};

    fn delta() -> Fixed {
        Fixed::from_num(16)
    }

    #[test]
    fn test_verify_determinism_counter() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![10]);
    }

    #[test]
    fn test_skirmish_is_deterministic() {
        assert!(verify_arena_determinism(|| skirmish_arena(42), delta(), 300));
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| skirmish_arena(7), delta(), 200), None);
    }

    #[test]
    fn test_parallel_arenas_match() {
        let result = run_parallel_arenas(|| skirmish_arena(11), 4, delta(), 150);
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_event_log_is_reproducible() {
        let setup = || arena_with(1, &["weapon_sword"], &[("enemy_slime", pos(1080, 1000))]);
        let (state_a, log_a) = run_recorded(&setup, delta(), 120);
        let (state_b, log_b) = run_recorded(&setup, delta(), 120);
        assert_eq!(state_a, state_b);
        assert_eq!(log_a, log_b);
    }
}
