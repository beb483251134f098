//! Boss lifecycle: spawn preparation, active tracking and reward hand-off.
//!
//! The controller does not own boss entities. The arena asks it for a
//! [`BossSpawnPlan`], inserts the enemy into its roster, then registers the
//! id. Death processing reports boss deaths back, which queues a reward for
//! the external UI to collect with [`BossFlowController::take_pending_rewards`].

use crate::data::{ContentTables, EnemyConfig};
use crate::enemy::EnemyBehavior;
use crate::events::{CombatEvent, EventBus};
use crate::math::Fixed;
use crate::roster::EntityId;

/// Everything needed to place a boss.
#[derive(Debug, Clone)]
pub struct BossSpawnPlan {
    /// Boss definition key.
    pub key: String,
    /// Template merged over the base enemy.
    pub config: EnemyConfig,
    /// Behavior picked from the definition.
    pub behavior: EnemyBehavior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveBoss {
    enemy: EntityId,
    key: String,
}

/// Tracks bosses across an encounter.
#[derive(Debug, Clone, Default)]
pub struct BossFlowController {
    active: Vec<ActiveBoss>,
    pending_rewards: u32,
    defeated: u32,
}

impl BossFlowController {
    /// No active bosses, no rewards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a boss definition into a spawnable template.
    ///
    /// Unknown boss or base enemy keys fall back (with a warning) instead of
    /// failing, so a bad table never aborts a wave.
    #[must_use]
    pub fn prepare(content: &ContentTables, key: &str, phase_interval: Fixed) -> BossSpawnPlan {
        let boss = content.boss_or_fallback(key);
        let base = content.enemy_or_fallback(&boss.base_enemy);
        let config = boss.merge(&base);
        let behavior = EnemyBehavior::select(Some(&boss.behavior), config.can_shoot(), phase_interval);
        tracing::debug!(
            boss = %boss.key,
            base = %base.key,
            behavior = behavior.state_name(),
            "Prepared boss spawn"
        );
        BossSpawnPlan {
            key: boss.key,
            config,
            behavior,
        }
    }

    /// Start tracking a spawned boss.
    pub fn register(&mut self, enemy: EntityId, key: &str, bus: &mut EventBus) {
        self.active.push(ActiveBoss {
            enemy,
            key: key.to_string(),
        });
        bus.publish(CombatEvent::BossSpawned {
            enemy,
            key: key.to_string(),
        });
    }

    /// Handle a boss death. Returns `false` for ids that are not tracked.
    pub fn on_boss_died(&mut self, enemy: EntityId, bus: &mut EventBus) -> bool {
        let Some(index) = self.active.iter().position(|b| b.enemy == enemy) else {
            return false;
        };
        let boss = self.active.remove(index);
        self.defeated += 1;
        self.pending_rewards += 1;
        tracing::info!(boss = %boss.key, enemy, remaining = self.active.len(), "Boss defeated");

        bus.publish(CombatEvent::BossDied {
            enemy,
            key: boss.key.clone(),
        });
        bus.publish(CombatEvent::BossFlowCompleted {
            key: boss.key,
            pending_rewards: self.pending_rewards,
        });
        if self.active.is_empty() {
            bus.publish(CombatEvent::BossEncounterCleared);
        }
        true
    }

    /// Ids of living bosses, in spawn order.
    pub fn active(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().map(|b| b.enemy)
    }

    /// Number of living bosses.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether `enemy` is a tracked boss.
    #[must_use]
    pub fn is_tracked(&self, enemy: EntityId) -> bool {
        self.active.iter().any(|b| b.enemy == enemy)
    }

    /// Rewards waiting for hand-off.
    #[must_use]
    pub const fn pending_rewards(&self) -> u32 {
        self.pending_rewards
    }

    /// Bosses killed so far.
    #[must_use]
    pub const fn defeated(&self) -> u32 {
        self.defeated
    }

    /// Hand every pending reward to the caller.
    pub fn take_pending_rewards(&mut self) -> u32 {
        std::mem::take(&mut self.pending_rewards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BossConfig;
    use crate::enemy::{BossBehaviorConfig, StationaryBurstParams};

    fn tables() -> ContentTables {
        ContentTables {
            enemies: vec![EnemyConfig {
                key: "brute".to_string(),
                health: Fixed::from_num(50),
                ..EnemyConfig::fallback()
            }],
            bosses: vec![BossConfig {
                behavior: BossBehaviorConfig::StationaryBurst(StationaryBurstParams::default()),
                ..BossConfig::fallback("brute")
            }],
            ..ContentTables::default()
        }
    }

    #[test]
    fn test_prepare_merges_base() {
        let plan = BossFlowController::prepare(&tables(), "fallback_boss", Fixed::from_num(3000));
        assert_eq!(plan.key, "fallback_boss");
        assert_eq!(plan.config.health, Fixed::from_num(500));
        assert!(matches!(plan.behavior, EnemyBehavior::StationaryBurst(_)));
    }

    #[test]
    fn test_unknown_boss_falls_back() {
        let plan = BossFlowController::prepare(&tables(), "missing", Fixed::from_num(3000));
        assert_eq!(plan.key, "fallback_boss");
    }

    #[test]
    fn test_last_death_clears_encounter() {
        let mut flow = BossFlowController::new();
        let mut bus = EventBus::new();
        flow.register(4, "king", &mut bus);
        flow.register(9, "queen", &mut bus);
        bus.drain();

        assert!(flow.on_boss_died(4, &mut bus));
        assert!(!flow.on_boss_died(4, &mut bus));
        let names: Vec<_> = bus.drain().iter().map(CombatEvent::name).collect();
        assert_eq!(names, vec!["boss-died", "boss-flow-completed"]);

        assert!(flow.on_boss_died(9, &mut bus));
        let names: Vec<_> = bus.drain().iter().map(CombatEvent::name).collect();
        assert_eq!(names, vec!["boss-died", "boss-flow-completed", "boss-encounter-cleared"]);

        assert_eq!(flow.take_pending_rewards(), 2);
        assert_eq!(flow.pending_rewards(), 0);
        assert_eq!(flow.defeated(), 2);
    }
}
