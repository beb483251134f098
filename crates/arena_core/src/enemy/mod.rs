//! Enemies: stats, status ledger, behavior, attack timing and movement.
//!
//! An [`Enemy`] owns exactly one of each per-enemy component. The arena
//! drives it once per tick through [`Enemy::think`] and routes damage
//! through [`Enemy::take_damage`].

mod behavior;
mod combat;
mod movement;
mod status;

pub use behavior::{
    BehaviorAction, BehaviorContext, BossBehaviorConfig, BurstState, EnemyBehavior, MovementVector,
    PhaseToggle, RhythmicArea, RhythmicAreaParams, RhythmicState, StationaryBurst, StationaryBurstParams,
    TacticalChase, TacticalChaseParams, TacticalState, TogglePhase,
};
pub use combat::{EnemyAttack, EnemyCombat, DEFAULT_STOMP_INTERVAL_MS, DEFAULT_TELEGRAPH_MS};
pub use movement::{EnemyMotion, Knockback, MovementInput, DEFAULT_ENEMY_SPEED};
pub use status::{EnemyStatus, StatusApplication, StatusEffect, StatusKind, StatusSettings, StatusTick};

use crate::data::EnemyConfig;
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::BodyHandle;
use crate::roster::EntityId;

/// Result of routing damage into an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The enemy was inactive or the amount was not positive.
    Ignored,
    /// Health went down, the enemy lives.
    Damaged,
    /// This hit brought health to zero or below.
    Killed,
}

/// What an enemy decided during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyDecision {
    /// Velocity to assign; `None` leaves the body's velocity untouched.
    pub velocity: Option<Vec2Fixed>,
    /// Side effects requested by the behavior.
    pub actions: Vec<BehaviorAction>,
    /// Attacks requested by the attack timer.
    pub attacks: Vec<EnemyAttack>,
}

/// A live enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EntityId,
    config: EnemyConfig,
    /// Last known position (synced from physics each tick).
    pub position: Vec2Fixed,
    health: Fixed,
    max_health: Fixed,
    active: bool,
    boss_key: Option<String>,
    status: EnemyStatus,
    behavior: EnemyBehavior,
    combat: EnemyCombat,
    motion: EnemyMotion,
    /// Physics body.
    pub body: Option<BodyHandle>,
}

impl Enemy {
    /// Build an enemy from its (possibly boss-merged) template.
    #[must_use]
    pub fn new(id: EntityId, config: EnemyConfig, behavior: EnemyBehavior, position: Vec2Fixed) -> Self {
        let speed = if config.speed > Fixed::ZERO {
            config.speed
        } else {
            Fixed::from_num(DEFAULT_ENEMY_SPEED)
        };
        let config = EnemyConfig { speed, ..config };
        Self {
            id,
            health: config.health,
            max_health: config.health,
            config,
            position,
            active: true,
            boss_key: None,
            status: EnemyStatus::new(),
            behavior,
            combat: EnemyCombat::new(),
            motion: EnemyMotion::new(),
            body: None,
        }
    }

    /// Mark this enemy as the boss spawned from `key`.
    #[must_use]
    pub fn into_boss(mut self, key: impl Into<String>) -> Self {
        self.boss_key = Some(key.into());
        self
    }

    /// Roster id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Template key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Template this enemy was built from.
    #[must_use]
    pub const fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> Fixed {
        self.max_health
    }

    /// Contact damage.
    #[must_use]
    pub const fn damage(&self) -> Fixed {
        self.config.damage
    }

    /// Base speed, units per second.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.config.speed
    }

    /// Body radius.
    #[must_use]
    pub fn radius(&self) -> Fixed {
        self.config.radius()
    }

    /// Whether this is a boss.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.boss_key.is_some()
    }

    /// Key of the boss definition, for bosses.
    #[must_use]
    pub fn boss_key(&self) -> Option<&str> {
        self.boss_key.as_deref()
    }

    /// Whether the enemy still takes part in the simulation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Active and with health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.active && self.health > Fixed::ZERO
    }

    /// Status ledger.
    #[must_use]
    pub const fn status(&self) -> &EnemyStatus {
        &self.status
    }

    /// Behavior state machine.
    #[must_use]
    pub const fn behavior(&self) -> &EnemyBehavior {
        &self.behavior
    }

    /// Attack timer.
    #[must_use]
    pub const fn combat(&self) -> &EnemyCombat {
        &self.combat
    }

    /// Subtract health. Health only ever goes down.
    pub fn take_damage(&mut self, amount: Fixed) -> DamageOutcome {
        if !self.active || amount <= Fixed::ZERO {
            return DamageOutcome::Ignored;
        }
        let was_alive = self.health > Fixed::ZERO;
        self.health -= amount;
        if was_alive && self.health <= Fixed::ZERO {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Deactivate the enemy. Returns `true` only on the first call.
    ///
    /// The status ledger is kept so death processing can still see a
    /// poison effect.
    pub fn die(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        tracing::debug!(enemy = self.id, key = %self.config.key, "Enemy died");
        true
    }

    /// Apply a status effect while active.
    pub fn apply_status(&mut self, application: &StatusApplication, settings: &StatusSettings) -> Option<StatusApplication> {
        self.is_alive().then(|| self.status.apply(application, settings))
    }

    /// Advance the status ledger.
    pub fn tick_status(&mut self, delta: Fixed, settings: &StatusSettings) -> StatusTick {
        if !self.active {
            return StatusTick::default();
        }
        self.status.update(delta, settings)
    }

    /// Check the enrage threshold (bosses only). `true` on the triggering call.
    pub fn check_enrage(&mut self) -> bool {
        if !self.is_boss() || !self.is_alive() {
            return false;
        }
        self.status
            .check_enrage(self.health, self.max_health, self.config.enrage_threshold())
    }

    /// Start a knockback away from `source`; returns the velocity to assign.
    pub fn knock_back(&mut self, source: Vec2Fixed, knockback: Knockback) -> Option<Vec2Fixed> {
        if !self.is_alive() {
            return None;
        }
        self.motion.apply_knockback(source, self.position, knockback)
    }

    /// Run behavior, attack timing and movement for one tick.
    pub fn think(&mut self, delta: Fixed, player: Option<Vec2Fixed>, settings: &StatusSettings) -> EnemyDecision {
        let mut decision = EnemyDecision::default();
        if !self.is_alive() {
            return decision;
        }

        let ctx = BehaviorContext {
            position: self.position,
            player,
            attack_range: self.config.ranged_attack.map(|ranged| ranged.range),
        };
        let is_boss = self.is_boss();
        self.behavior.update(delta, &ctx, &mut decision.actions);
        decision.attacks = self
            .combat
            .update(delta, &self.config, is_boss, self.position, player);

        let input = MovementInput {
            vector: self.behavior.movement_vector(&ctx),
            base_speed: self.config.speed,
            status_multiplier: self.status.speed_multiplier(settings),
            halted: self.status.is_stunned() || self.combat.is_telegraphing(),
        };
        decision.velocity = self.motion.step(delta, input);
        decision
    }

    /// Resolve a telegraph started by [`Enemy::think`].
    ///
    /// Returns whether the shot may fire: the enemy must still be active
    /// and alive at fire time.
    pub fn resolve_telegraph(&mut self) -> bool {
        let fire = self.is_alive();
        self.combat.finish_telegraph(fire, &self.config);
        fire
    }

    /// Roll the XP drop for a uniform sample in `[0, 1)`.
    #[must_use]
    pub fn roll_xp(&self, sample: Fixed) -> Option<u32> {
        (sample < self.config.xp_drop_chance && self.config.xp_value > 0).then_some(self.config.xp_value)
    }
}
