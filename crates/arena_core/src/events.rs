//! Session event bus.
//!
//! Combat code publishes what happened (a swing, a hit, a death, a boss
//! phase) and never reads anything back through the bus. Rendering, audio
//! and UI collaborators subscribe to it, or drain the per-tick log that
//! [`Arena::tick`](crate::arena::Arena::tick) returns.
//!
//! One bus exists per session and is passed explicitly to the components
//! that publish; there is no global instance.

use std::fmt;

use crate::enemy::StatusKind;
use crate::math::{Fixed, Vec2Fixed};
use crate::pickup::PickupKind;
use crate::pool::PoolHandle;
use crate::roster::EntityId;

/// Identifier of a melee hitbox, unique per session.
pub type HitboxId = u64;

/// What dealt a given amount of damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// A melee swing hitbox.
    Melee,
    /// A player projectile or trail.
    Projectile,
    /// A damage-over-time tick.
    Status(StatusKind),
    /// Body contact with an enemy.
    EnemyContact,
    /// An enemy projectile.
    EnemyProjectile,
}

/// Everything the simulation reports to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    /// A weapon executed its attack against a target.
    WeaponAttack {
        /// Weapon template key.
        weapon: String,
        /// Enemy that was targeted.
        target: EntityId,
    },
    /// A trail weapon launched a projectile.
    WeaponShoot {
        /// Weapon template key.
        weapon: String,
        /// Pooled projectile.
        projectile: PoolHandle,
        /// Spawn position.
        origin: Vec2Fixed,
        /// Unit travel direction.
        direction: Vec2Fixed,
    },
    /// A melee hitbox became live.
    HitboxSpawned {
        /// Weapon template key.
        weapon: String,
        /// Hitbox identifier.
        hitbox: HitboxId,
        /// Hitbox centre.
        center: Vec2Fixed,
    },
    /// A melee hitbox was torn down.
    HitboxRemoved {
        /// Hitbox identifier.
        hitbox: HitboxId,
    },
    /// An enemy lost health.
    EnemyDamaged {
        /// Damaged enemy.
        enemy: EntityId,
        /// Damage applied.
        amount: Fixed,
        /// Whether the hit was critical.
        is_critical: bool,
        /// What dealt the damage.
        source: DamageSource,
    },
    /// An enemy's health reached zero.
    EnemyDied {
        /// Dead enemy.
        enemy: EntityId,
        /// Position at death.
        position: Vec2Fixed,
        /// Whether it was a boss.
        is_boss: bool,
    },
    /// A status effect was applied or refreshed.
    StatusApplied {
        /// Affected enemy.
        enemy: EntityId,
        /// Effect type.
        kind: StatusKind,
        /// Damage per tick.
        damage: Fixed,
        /// Duration in ms.
        duration: Fixed,
    },
    /// A status effect ran out.
    StatusExpired {
        /// Affected enemy.
        enemy: EntityId,
        /// Effect type.
        kind: StatusKind,
    },
    /// A poisoned enemy died and spread poison to its neighbours.
    PoisonSpread {
        /// Enemy that died.
        source: EntityId,
        /// Enemies that received poison.
        targets: Vec<EntityId>,
    },
    /// A boss crossed its enrage threshold.
    BossEnraged {
        /// The boss.
        enemy: EntityId,
    },
    /// A boss entered the arena.
    BossSpawned {
        /// The boss.
        enemy: EntityId,
        /// Boss definition key.
        key: String,
    },
    /// A boss took damage.
    BossHealthChanged {
        /// The boss.
        enemy: EntityId,
        /// Remaining health.
        health: Fixed,
        /// Maximum health.
        max_health: Fixed,
    },
    /// A boss stomped (area pulse).
    BossStomp {
        /// The boss.
        enemy: EntityId,
        /// Centre of the stomp.
        position: Vec2Fixed,
    },
    /// A boss died.
    BossDied {
        /// The boss.
        enemy: EntityId,
        /// Boss definition key.
        key: String,
    },
    /// A boss reward is ready to be handed to the player.
    BossFlowCompleted {
        /// Boss definition key.
        key: String,
        /// Rewards waiting for hand-off.
        pending_rewards: u32,
    },
    /// No boss remains alive.
    BossEncounterCleared,
    /// An enemy began a telegraphed attack.
    TelegraphStarted {
        /// Attacking enemy.
        enemy: EntityId,
        /// Telegraph duration in ms.
        duration: Fixed,
    },
    /// An enemy fired a projectile.
    EnemyShoot {
        /// Attacking enemy.
        enemy: EntityId,
        /// Pooled projectile.
        projectile: PoolHandle,
        /// Spawn position.
        origin: Vec2Fixed,
        /// Unit travel direction.
        direction: Vec2Fixed,
    },
    /// An enemy dropped a trail hazard.
    EnemyTrail {
        /// Attacking enemy.
        enemy: EntityId,
        /// Pooled hazard.
        projectile: PoolHandle,
        /// Hazard position.
        position: Vec2Fixed,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Damage applied.
        amount: Fixed,
        /// Remaining health.
        health: Fixed,
        /// What dealt the damage.
        source: DamageSource,
    },
    /// The player died.
    PlayerDied,
    /// A structure was placed.
    StructureSpawned {
        /// The structure.
        structure: EntityId,
        /// Structure template key.
        key: String,
    },
    /// A structure lost hit points.
    StructureDamaged {
        /// The structure.
        structure: EntityId,
        /// Damage applied.
        amount: Fixed,
        /// Remaining hit points.
        hp: Fixed,
    },
    /// A structure was destroyed.
    StructureDestroyed {
        /// The structure.
        structure: EntityId,
        /// Structure template key.
        key: String,
        /// Position at destruction.
        position: Vec2Fixed,
    },
    /// A pickup appeared.
    PickupSpawned {
        /// Pooled pickup.
        pickup: PoolHandle,
        /// Pickup type.
        kind: PickupKind,
        /// Where it lies.
        position: Vec2Fixed,
    },
    /// The player collected a pickup.
    PickupCollected {
        /// Pooled pickup.
        pickup: PoolHandle,
        /// Pickup type.
        kind: PickupKind,
        /// Pickup value (XP amount for gems).
        value: u32,
    },
}

impl CombatEvent {
    /// Stable event name consumed by presentation collaborators.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WeaponAttack { .. } => "weapon-attack",
            Self::WeaponShoot { .. } => "weapon-shoot",
            Self::HitboxSpawned { .. } => "melee-hitbox-spawned",
            Self::HitboxRemoved { .. } => "melee-hitbox-removed",
            Self::EnemyDamaged { .. } => "enemy-damaged",
            Self::EnemyDied { .. } => "enemy-died",
            Self::StatusApplied { .. } => "status-applied",
            Self::StatusExpired { .. } => "status-expired",
            Self::PoisonSpread { .. } => "poison-spread",
            Self::BossEnraged { .. } => "boss-enraged",
            Self::BossSpawned { .. } => "boss-spawned",
            Self::BossHealthChanged { .. } => "boss-health-changed",
            Self::BossStomp { .. } => "boss-stomp",
            Self::BossDied { .. } => "boss-died",
            Self::BossFlowCompleted { .. } => "boss-flow-completed",
            Self::BossEncounterCleared => "boss-encounter-cleared",
            Self::TelegraphStarted { .. } => "enemy-telegraph",
            Self::EnemyShoot { .. } => "enemy-shoot",
            Self::EnemyTrail { .. } => "enemy-trail",
            Self::PlayerDamaged { .. } => "player-damaged",
            Self::PlayerDied => "player-died",
            Self::StructureSpawned { .. } => "structure-spawned",
            Self::StructureDamaged { .. } => "structure-damaged",
            Self::StructureDestroyed { .. } => "structure-destroyed",
            Self::PickupSpawned { .. } => "pickup-spawned",
            Self::PickupCollected { .. } => "pickup-collected",
        }
    }
}

/// Callback invoked for every published event.
pub type Subscriber = Box<dyn FnMut(&CombatEvent)>;

/// Publish/subscribe handle owned by one session.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    log: Vec<CombatEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("log", &self.log)
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that sees every subsequent event.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CombatEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Publish an event to every subscriber and append it to the tick log.
    pub fn publish(&mut self, event: CombatEvent) {
        tracing::trace!(event = event.name(), "Publish");
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        self.log.push(event);
    }

    /// Events published since the last drain.
    #[must_use]
    pub fn pending(&self) -> &[CombatEvent] {
        &self.log
    }

    /// Take the events published since the last drain.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.log)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_subscribers_see_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(move |event| sink.borrow_mut().push(event.name()));

        bus.publish(CombatEvent::PlayerDied);
        bus.publish(CombatEvent::BossEncounterCleared);

        assert_eq!(*seen.borrow(), vec!["player-died", "boss-encounter-cleared"]);
    }

    #[test]
    fn test_drain_empties_log() {
        let mut bus = EventBus::new();
        bus.publish(CombatEvent::PlayerDied);
        assert_eq!(bus.pending().len(), 1);
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.drain().is_empty());
    }
}
