//! Headless arena runs.
//!
//! Spawns a ring of enemies around the player, ticks a fixed number of
//! frames and tallies what happened. Used to eyeball balance changes and to
//! confirm a seed reproduces.

use std::collections::BTreeMap;
use std::fmt;

use arena_core::arena::Arena;
use arena_core::config::ArenaConfig;
use arena_core::data::ContentTables;
use arena_core::math::{Fixed, Vec2Fixed};

/// Run parameters.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// RNG seed; overrides the config's.
    pub seed: u64,
    /// Frames to run.
    pub ticks: u64,
    /// Frame length in milliseconds.
    pub delta_ms: u32,
    /// Enemies to spawn.
    pub enemies: u32,
    /// Enemy key for the ring.
    pub enemy: String,
    /// Weapons to equip.
    pub weapons: Vec<String>,
    /// Optional boss spawned opposite the ring.
    pub boss: Option<String>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            ticks: 600,
            delta_ms: 16,
            enemies: 20,
            enemy: "enemy_slime".to_string(),
            weapons: vec!["weapon_sword".to_string()],
            boss: None,
        }
    }
}

/// Tally of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Seed used.
    pub seed: u64,
    /// Frames run.
    pub ticks: u64,
    /// Event counts keyed by event name.
    pub events: BTreeMap<&'static str, usize>,
    /// Enemies left alive.
    pub enemies_remaining: usize,
    /// Player health at the end.
    pub player_health: Fixed,
    /// XP collected by the player.
    pub player_xp: u32,
    /// Final state hash.
    pub state_hash: u64,
}

impl SimulationReport {
    /// Count for one event name.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events.get(name).copied().unwrap_or(0)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {} / {} ticks / hash {:016x}", self.seed, self.ticks, self.state_hash)?;
        writeln!(
            f,
            "player health {} xp {}, {} enemies remaining",
            self.player_health, self.player_xp, self.enemies_remaining
        )?;
        for (name, count) in &self.events {
            writeln!(f, "  {name:<24} {count}")?;
        }
        Ok(())
    }
}

/// Place `count` enemies on a ring of the given radius.
fn ring_positions(center: Vec2Fixed, count: u32, radius: i32) -> Vec<Vec2Fixed> {
    // Eight compass offsets, widened each lap.
    const OFFSETS: [(i32, i32); 8] = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];
    (0..count)
        .map(|i| {
            let (dx, dy) = OFFSETS[i as usize % OFFSETS.len()];
            let lap = i32::try_from(i / 8).unwrap_or(0) + 1;
            center + Vec2Fixed::from_ints(dx * radius * lap / 2, dy * radius * lap / 2)
        })
        .collect()
}

/// Run one arena to completion.
#[must_use]
pub fn run(config: ArenaConfig, content: ContentTables, options: &SimulationOptions) -> SimulationReport {
    let mut arena = Arena::new(ArenaConfig { seed: options.seed, ..config }, content);
    for weapon in &options.weapons {
        arena.equip_weapon(weapon);
    }
    let center = arena.player().position;
    for position in ring_positions(center, options.enemies, 300) {
        arena.spawn_enemy(&options.enemy, position);
    }
    if let Some(boss) = &options.boss {
        arena.spawn_boss(boss, center + Vec2Fixed::from_ints(0, -500));
    }

    let delta = Fixed::from_num(options.delta_ms);
    let mut events = BTreeMap::new();
    for _ in 0..options.ticks {
        for event in arena.tick(delta) {
            *events.entry(event.name()).or_insert(0) += 1;
        }
    }

    tracing::info!(
        seed = options.seed,
        ticks = options.ticks,
        remaining = arena.enemies().len(),
        "Simulation finished"
    );

    SimulationReport {
        seed: options.seed,
        ticks: options.ticks,
        events,
        enemies_remaining: arena.enemies().len(),
        player_health: arena.player().health(),
        player_xp: arena.player().xp(),
        state_hash: arena.state_hash(),
    }
}
