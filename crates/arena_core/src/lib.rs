//! # Arena Core
//!
//! Real-time combat simulation core for an arena survival-action game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO (content arrives as already-loaded RON text)
//! - No system randomness (one seeded RNG per session)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless simulation runs and balance tooling
//! - Determinism testing
//! - Swapping the physics backend behind a trait
//!
//! ## Crate Structure
//!
//! - [`weapon`] - Weapon cooldowns, targeting and attack strategies
//! - [`enemy`] - Enemy behaviors, attack timing, movement and status effects
//! - [`pool`] - Generational object pool backing projectiles and pickups
//! - [`combat`] - Damage routing and collision resolution
//! - [`boss_flow`] - Boss spawn preparation and reward hand-off
//! - [`arena`] - Session driver tying everything together
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod arena;
pub mod boss_flow;
pub mod combat;
pub mod config;
pub mod data;
pub mod enemy;
pub mod error;
pub mod events;
pub mod math;
pub mod physics;
pub mod pickup;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod roster;
pub mod scheduler;
pub mod stats;
pub mod structure;
pub mod weapon;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::arena::{Arena, DeferredTask};
    pub use crate::boss_flow::BossFlowController;
    pub use crate::combat::{CombatSystem, CombatWorld};
    pub use crate::config::{ArenaConfig, PlayerSettings};
    pub use crate::data::{BossConfig, ContentTables, EnemyConfig, StructureConfig, WeaponConfig};
    pub use crate::enemy::{Enemy, EnemyBehavior, StatusApplication, StatusKind, StatusSettings};
    pub use crate::error::{ArenaError, Result};
    pub use crate::events::{CombatEvent, DamageSource, EventBus};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::physics::{KinematicWorld, PhysicsBackend};
    pub use crate::pool::{ObjectPool, PoolHandle, Poolable};
    pub use crate::roster::EntityId;
    pub use crate::stats::{ResolvedStats, StatKind, StatModifier};
    pub use crate::weapon::Weapon;
}
