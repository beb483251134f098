//! Session driver.
//!
//! [`Arena`] owns one play session: configuration, content tables, the
//! player and their weapons, enemies, structures, both pools, the event bus,
//! the deferred-task queue, the seeded RNG, the boss flow controller and the
//! physics collaborator.
//!
//! # Determinism
//!
//! - Fixed-point math only (see [`Fixed`]).
//! - One seeded `ChaCha8Rng` per session; every crit and loot roll draws
//!   from it in a fixed order.
//! - Rosters are walked in ascending id order.
//!
//! Two arenas built from the same configuration and content, fed the same
//! calls, publish the same events and report the same [`Arena::state_hash`].
//!
//! # Tick order
//!
//! 1. player bookkeeping and position sync
//! 2. due deferred tasks (telegraphed shots, delayed pickups)
//! 3. enemy status ticks
//! 4. enemy behavior, attack timing and movement
//! 5. weapons (attacks only while the player is alive; owned trails and
//!    hitboxes keep aging)
//! 6. enemy projectile lifetimes
//! 7. physics step, enemy clamping, collision resolution
//! 8. death processing (poison spread, loot, boss flow) and sweep
//! 9. pickup recycling
//!
//! # Example
//!
//! ```
//! use arena_core::arena::Arena;
//! use arena_core::config::ArenaConfig;
//! use arena_core::data::ContentTables;
//! use arena_core::math::{Fixed, Vec2Fixed};
//!
//! let mut arena = Arena::new(ArenaConfig::default(), ContentTables::default());
//! arena.equip_weapon("sword");
//! arena.spawn_enemy("slime", Vec2Fixed::from_ints(1100, 1000));
//! let events = arena.tick(Fixed::from_num(1000));
//! assert_eq!(arena.current_tick(), 1);
//! assert!(events.iter().any(|e| e.name() == "weapon-attack"));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::boss_flow::BossFlowController;
use crate::combat::{Casualty, CombatSystem, CombatWorld};
use crate::config::ArenaConfig;
use crate::data::{ContentTables, EnemyConfig, EnemyProjectileConfig};
use crate::enemy::{
    BehaviorAction, DamageOutcome, Enemy, EnemyAttack, EnemyBehavior, Knockback, StatusApplication, StatusKind,
};
use crate::events::{CombatEvent, DamageSource, EventBus, HitboxId};
use crate::math::{unit_sample, Fixed, Vec2Fixed};
use crate::physics::{BodyTag, KinematicWorld, PhysicsBackend};
use crate::pickup::{self, Pickup, PickupKind, PickupSpawn};
use crate::player::Player;
use crate::pool::{ObjectPool, PoolHandle};
use crate::projectile::{self, Faction, Projectile, ProjectileSpawn};
use crate::roster::{EntityId, Roster};
use crate::scheduler::DeferredQueue;
use crate::structure::Structure;
use crate::weapon::{Weapon, Wielder};

/// Work scheduled for a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// A telegraph ran out; fire if the enemy still lives.
    FireTelegraphed {
        /// Attacking enemy.
        enemy: EntityId,
    },
    /// A rolled drop appears on the ground.
    SpawnPickup(PickupSpawn),
}

struct Parts<'a> {
    world: CombatWorld<'a>,
    player: &'a mut Player,
    weapons: &'a mut Vec<Weapon>,
    combat: &'a mut CombatSystem,
}

/// One play session.
pub struct Arena<P: PhysicsBackend = KinematicWorld> {
    config: ArenaConfig,
    content: ContentTables,
    physics: P,
    player: Player,
    weapons: Vec<Weapon>,
    enemies: Roster<Enemy>,
    structures: Roster<Structure>,
    projectiles: ObjectPool<Projectile>,
    enemy_projectiles: Vec<PoolHandle>,
    pickups: ObjectPool<Pickup>,
    bus: EventBus,
    deferred: DeferredQueue<DeferredTask>,
    rng: ChaCha8Rng,
    boss_flow: BossFlowController,
    combat: CombatSystem,
    casualties: Vec<Casualty>,
    next_hitbox: HitboxId,
    tick: u64,
}

impl Arena<KinematicWorld> {
    /// Create a session on the reference kinematic backend.
    #[must_use]
    pub fn new(config: ArenaConfig, content: ContentTables) -> Self {
        let physics = KinematicWorld::new(config.world_min, config.world_max);
        Self::with_physics(config, content, physics)
    }
}

impl<P: PhysicsBackend> Arena<P> {
    /// Create a session on a caller-supplied physics backend.
    pub fn with_physics(config: ArenaConfig, content: ContentTables, mut physics: P) -> Self {
        let combat = CombatSystem::new(&mut physics);
        let mut player = Player::new(&config.player);
        player.body = Some(physics.spawn_body(BodyTag::Player, player.position, player.radius()));
        tracing::info!(
            seed = config.seed,
            weapons = content.weapons.len(),
            enemies = content.enemies.len(),
            bosses = content.bosses.len(),
            "Arena session created"
        );
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            projectiles: ObjectPool::with_capacity(config.projectile_pool_capacity),
            pickups: ObjectPool::with_capacity(config.pickup_pool_capacity),
            config,
            content,
            physics,
            player,
            weapons: Vec::new(),
            enemies: Roster::new(),
            structures: Roster::new(),
            enemy_projectiles: Vec::new(),
            bus: EventBus::new(),
            deferred: DeferredQueue::new(),
            boss_flow: BossFlowController::new(),
            combat,
            casualties: Vec::new(),
            next_hitbox: 1,
            tick: 0,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Content tables.
    #[must_use]
    pub const fn content(&self) -> &ContentTables {
        &self.content
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time, ms.
    #[must_use]
    pub fn elapsed(&self) -> Fixed {
        self.deferred.now()
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The player, for movement input and stat modifiers.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Equipped weapons in equip order.
    #[must_use]
    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Enemy roster.
    #[must_use]
    pub const fn enemies(&self) -> &Roster<Enemy> {
        &self.enemies
    }

    /// Structure roster.
    #[must_use]
    pub const fn structures(&self) -> &Roster<Structure> {
        &self.structures
    }

    /// Shared projectile pool.
    #[must_use]
    pub const fn projectiles(&self) -> &ObjectPool<Projectile> {
        &self.projectiles
    }

    /// Pickup pool.
    #[must_use]
    pub const fn pickups(&self) -> &ObjectPool<Pickup> {
        &self.pickups
    }

    /// Physics backend.
    #[must_use]
    pub const fn physics(&self) -> &P {
        &self.physics
    }

    /// Boss lifecycle.
    #[must_use]
    pub const fn boss_flow(&self) -> &BossFlowController {
        &self.boss_flow
    }

    /// Collision wiring.
    #[must_use]
    pub const fn combat(&self) -> &CombatSystem {
        &self.combat
    }

    /// Tasks waiting in the deferred queue.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Hand pending boss rewards to the caller.
    pub fn take_boss_rewards(&mut self) -> u32 {
        self.boss_flow.take_pending_rewards()
    }

    /// Register an event subscriber.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CombatEvent) + 'static) {
        self.bus.subscribe(subscriber);
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Equip a weapon by key (falls back to the first weapon in the table).
    pub fn equip_weapon(&mut self, key: &str) -> usize {
        let weapon = Weapon::new(self.content.weapon_or_fallback(key));
        tracing::debug!(weapon = weapon.key(), strategy = ?weapon.config().weapon_type, "Weapon equipped");
        self.weapons.push(weapon);
        self.weapons.len() - 1
    }

    /// Remove the first equipped weapon with `key`, releasing its hitboxes
    /// and trails. Returns whether a weapon was removed.
    pub fn unequip_weapon(&mut self, key: &str) -> bool {
        let Some(index) = self.weapons.iter().position(|w| w.key() == key) else {
            return false;
        };
        let mut weapon = self.weapons.remove(index);
        let mut parts = self.parts();
        weapon.unequip(&mut parts.world);
        true
    }

    /// Spawn a regular enemy.
    pub fn spawn_enemy(&mut self, key: &str, position: Vec2Fixed) -> EntityId {
        let config = self.content.enemy_or_fallback(key);
        let behavior = EnemyBehavior::select(None, config.can_shoot(), self.config.boss_phase_interval);
        self.insert_enemy(config, behavior, position, None)
    }

    /// Spawn a boss from its definition.
    pub fn spawn_boss(&mut self, key: &str, position: Vec2Fixed) -> EntityId {
        let plan = BossFlowController::prepare(&self.content, key, self.config.boss_phase_interval);
        let id = self.insert_enemy(plan.config, plan.behavior, position, Some(plan.key.clone()));
        self.boss_flow.register(id, &plan.key, &mut self.bus);
        id
    }

    /// Place a destructible structure.
    pub fn spawn_structure(&mut self, key: &str, position: Vec2Fixed) -> EntityId {
        let config = self.content.structure_or_fallback(key);
        let key = config.key.clone();
        let radius = config.radius();
        let id = self
            .structures
            .insert_with(|id| Structure::new(id, config, position));
        let body = self.physics.spawn_body(BodyTag::Structure(id), position, radius);
        if let Some(structure) = self.structures.get_mut(id) {
            structure.body = Some(body);
        }
        self.bus.publish(CombatEvent::StructureSpawned { structure: id, key });
        id
    }

    // ------------------------------------------------------------------
    // External effects
    // ------------------------------------------------------------------
    //
    // Hooks for damage that originates outside the weapon loop (hazards,
    // scripted events, debug commands). Events land on the bus and come back
    // from the next `tick`, which also runs death processing for any kill.

    /// Apply a status effect to a living enemy. Returns whether it landed.
    pub fn apply_status(&mut self, id: EntityId, application: &StatusApplication) -> bool {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return false;
        };
        let Some(applied) = enemy.apply_status(application, &self.config.status) else {
            return false;
        };
        self.bus.publish(CombatEvent::StatusApplied {
            enemy: id,
            kind: applied.kind,
            damage: applied.damage,
            duration: applied.duration,
        });
        true
    }

    /// Damage an enemy directly.
    pub fn damage_enemy(&mut self, id: EntityId, amount: Fixed, source: DamageSource) -> DamageOutcome {
        let Parts { mut world, .. } = self.parts();
        world.damage_enemy(id, amount, false, source)
    }

    /// Damage a structure directly.
    pub fn damage_structure(&mut self, id: EntityId, amount: Fixed) -> DamageOutcome {
        let Parts { mut world, .. } = self.parts();
        world.hit_structure(id, amount)
    }

    fn insert_enemy(
        &mut self,
        config: EnemyConfig,
        behavior: EnemyBehavior,
        position: Vec2Fixed,
        boss_key: Option<String>,
    ) -> EntityId {
        let position = self.physics.clamp_position(position, self.config.clamp_margin);
        let radius = config.radius();
        let id = self.enemies.insert_with(|id| {
            let enemy = Enemy::new(id, config, behavior, position);
            match boss_key {
                Some(key) => enemy.into_boss(key),
                None => enemy,
            }
        });
        let body = self.physics.spawn_body(BodyTag::Enemy(id), position, radius);
        if let Some(enemy) = self.enemies.get_mut(id) {
            enemy.body = Some(body);
            tracing::debug!(enemy = id, key = enemy.key(), boss = enemy.is_boss(), "Enemy spawned");
        }
        id
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the session by `delta` ms and return the events it produced.
    pub fn tick(&mut self, delta: Fixed) -> Vec<CombatEvent> {
        self.tick += 1;

        self.player.update(delta);
        self.sync_positions();

        for task in self.deferred.advance(delta) {
            self.run_task(task);
        }

        self.run_status_ticks(delta);
        self.run_enemies(delta);

        self.run_weapons(delta);

        self.age_enemy_projectiles(delta);

        let contacts = self.physics.step(delta);
        self.clamp_enemies();
        self.sync_positions();
        {
            let Parts {
                mut world,
                player,
                combat,
                ..
            } = self.parts();
            combat.resolve(&contacts, &mut world, player);
        }

        self.process_casualties();

        let recycled = pickup::recycle(&mut self.pickups, &mut self.physics);
        if recycled > 0 {
            tracing::trace!(recycled, "Pickups recycled");
        }

        #[cfg(any(debug_assertions, feature = "debug-validation"))]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Arena state hash");
        }

        self.bus.drain()
    }

    fn parts(&mut self) -> Parts<'_> {
        let Self {
            config,
            physics,
            player,
            weapons,
            enemies,
            structures,
            projectiles,
            pickups,
            bus,
            rng,
            combat,
            casualties,
            next_hitbox,
            ..
        } = self;
        Parts {
            world: CombatWorld {
                enemies,
                structures,
                projectiles,
                pickups,
                physics,
                bus,
                rng,
                status: &config.status,
                casualties,
                next_hitbox,
            },
            player,
            weapons,
            combat,
        }
    }

    /// Push the player's position into physics; pull everything else out.
    fn sync_positions(&mut self) {
        if let Some(body) = self.player.body {
            self.physics.set_position(body, self.player.position);
        }
        for id in self.enemies.sorted_ids() {
            if let Some(enemy) = self.enemies.get_mut(id) {
                if let Some(position) = enemy.body.and_then(|b| self.physics.position(b)) {
                    enemy.position = position;
                }
            }
        }
        let leased: Vec<PoolHandle> = self.projectiles.iter_leased().map(|(h, _)| h).collect();
        for handle in leased {
            if let Some(projectile) = self.projectiles.get_mut(handle) {
                if let Some(position) = projectile.body.and_then(|b| self.physics.position(b)) {
                    projectile.position = position;
                }
            }
        }
    }

    fn run_task(&mut self, task: DeferredTask) {
        match task {
            DeferredTask::FireTelegraphed { enemy } => {
                let Some(attacker) = self.enemies.get_mut(enemy) else {
                    return;
                };
                if attacker.resolve_telegraph() && self.player.is_alive() {
                    let target = self.player.position;
                    self.fire_enemy_projectile(enemy, target);
                }
            }
            DeferredTask::SpawnPickup(spawn) => {
                let handle = pickup::place(&mut self.pickups, &mut self.physics, spawn);
                self.bus.publish(CombatEvent::PickupSpawned {
                    pickup: handle,
                    kind: spawn.kind,
                    position: spawn.position,
                });
            }
        }
    }

    fn run_status_ticks(&mut self, delta: Fixed) {
        let ids = self.enemies.sorted_ids();
        let Parts { mut world, .. } = self.parts();
        for id in ids {
            let Some(enemy) = world.enemies.get_mut(id) else {
                continue;
            };
            let tick = enemy.tick_status(delta, world.status);
            for (kind, damage) in tick.damage {
                world.damage_enemy(id, damage, false, DamageSource::Status(kind));
            }
            for kind in tick.expired {
                world.bus.publish(CombatEvent::StatusExpired { enemy: id, kind });
            }
        }
    }

    fn run_enemies(&mut self, delta: Fixed) {
        let target = self.player.is_alive().then_some(self.player.position);
        for id in self.enemies.sorted_ids() {
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };
            let decision = enemy.think(delta, target, &self.config.status);
            let position = enemy.position;
            if let (Some(velocity), Some(body)) = (decision.velocity, enemy.body) {
                self.physics.set_velocity(body, velocity);
            }

            for action in decision.actions {
                match action {
                    BehaviorAction::Stomp => self.bus.publish(CombatEvent::BossStomp { enemy: id, position }),
                    BehaviorAction::Telegraph(duration) => {
                        self.bus.publish(CombatEvent::TelegraphStarted { enemy: id, duration });
                    }
                    BehaviorAction::Fire => {
                        if let Some(player) = target {
                            self.fire_enemy_projectile(id, player);
                        }
                    }
                }
            }

            for attack in decision.attacks {
                match attack {
                    EnemyAttack::Telegraph { delay } => {
                        self.bus.publish(CombatEvent::TelegraphStarted {
                            enemy: id,
                            duration: delay,
                        });
                        self.deferred.schedule(delay, DeferredTask::FireTelegraphed { enemy: id });
                    }
                    EnemyAttack::Trail => self.drop_enemy_trail(id),
                    EnemyAttack::Stomp => self.bus.publish(CombatEvent::BossStomp { enemy: id, position }),
                }
            }
        }
    }

    fn run_weapons(&mut self, delta: Fixed) {
        let Parts {
            mut world,
            player,
            weapons,
            ..
        } = self.parts();
        let wielder = Wielder {
            position: player.position,
            stats: *player.stats(),
            alive: player.is_alive(),
        };
        for weapon in weapons.iter_mut() {
            weapon.update(delta, &wielder, &mut world);
        }
    }

    fn enemy_projectile_spawn(&self, template: EnemyProjectileConfig, enemy: &Enemy) -> (Fixed, ProjectileSpawn) {
        let speed = template.speed.unwrap_or(self.config.enemy_projectile_speed);
        let spawn = ProjectileSpawn {
            faction: Faction::Enemy,
            origin: enemy.position,
            velocity: Vec2Fixed::ZERO,
            damage: template.damage.unwrap_or_else(|| enemy.damage()),
            is_critical: false,
            knockback: Knockback::default(),
            knockback_multiplier: Fixed::ONE,
            elemental: None,
            lifetime: template.lifetime_ms.unwrap_or(self.config.projectile_lifetime),
            radius: template.radius.unwrap_or(self.config.enemy_projectile_radius),
        };
        (speed, spawn)
    }

    fn fire_enemy_projectile(&mut self, id: EntityId, target: Vec2Fixed) {
        let Some(enemy) = self.enemies.get(id).filter(|e| e.is_alive()) else {
            return;
        };
        let Some(direction) = enemy.position.direction_to(target) else {
            tracing::warn!(enemy = id, "Enemy shot skipped, target on top of shooter");
            return;
        };
        let template = enemy
            .config()
            .ranged_attack
            .map(|ranged| ranged.projectile)
            .unwrap_or_default();
        let (speed, mut spawn) = self.enemy_projectile_spawn(template, enemy);
        spawn.velocity = direction.scale(speed);
        let origin = spawn.origin;

        let handle = projectile::launch(&mut self.projectiles, &mut self.physics, spawn);
        self.enemy_projectiles.push(handle);
        self.bus.publish(CombatEvent::EnemyShoot {
            enemy: id,
            projectile: handle,
            origin,
            direction,
        });
    }

    fn drop_enemy_trail(&mut self, id: EntityId) {
        let Some(enemy) = self.enemies.get(id).filter(|e| e.is_alive()) else {
            return;
        };
        let template = enemy
            .config()
            .trail_attack
            .map(|trail| trail.projectile)
            .unwrap_or_default();
        let (_, spawn) = self.enemy_projectile_spawn(template, enemy);
        let position = spawn.origin;

        let handle = projectile::launch(&mut self.projectiles, &mut self.physics, spawn);
        self.enemy_projectiles.push(handle);
        self.bus.publish(CombatEvent::EnemyTrail {
            enemy: id,
            projectile: handle,
            position,
        });
    }

    fn age_enemy_projectiles(&mut self, delta: Fixed) {
        let projectiles = &mut self.projectiles;
        let physics = &mut self.physics;
        self.enemy_projectiles.retain(|&handle| {
            let alive = match projectiles.get_mut(handle) {
                Some(projectile) if projectile.is_active() => projectile.update(delta),
                Some(_) => false,
                None => return false,
            };
            if !alive {
                projectile::retire(projectiles, physics, handle);
            }
            alive
        });
    }

    fn clamp_enemies(&mut self) {
        let margin = self.config.clamp_margin;
        for id in self.enemies.sorted_ids() {
            let Some(body) = self.enemies.get(id).filter(|e| e.is_active()).and_then(|e| e.body) else {
                continue;
            };
            let Some(position) = self.physics.position(body) else {
                continue;
            };
            let clamped = self.physics.clamp_position(position, margin);
            if clamped != position {
                self.physics.set_position(body, clamped);
            }
        }
    }

    // ------------------------------------------------------------------
    // Death processing
    // ------------------------------------------------------------------

    fn process_casualties(&mut self) {
        let casualties = std::mem::take(&mut self.casualties);
        for casualty in casualties {
            match casualty {
                Casualty::Enemy(id) => self.process_enemy_death(id),
                Casualty::Structure(id) => self.process_structure_death(id),
            }
        }

        let swept = self.enemies.sweep(|e| !e.is_active());
        let knocked = self.structures.sweep(|s| !s.is_active());
        if !swept.is_empty() {
            self.deferred.cancel_where(
                |task| matches!(task, DeferredTask::FireTelegraphed { enemy } if swept.binary_search(enemy).is_ok()),
            );
        }
        if !swept.is_empty() || !knocked.is_empty() {
            tracing::debug!(enemies = ?swept, structures = ?knocked, "Swept dead entities");
        }
    }

    fn process_enemy_death(&mut self, id: EntityId) {
        let Some(enemy) = self.enemies.get(id) else {
            return;
        };
        let position = enemy.position;
        let poisoned = enemy.status().has(StatusKind::Poison);
        let is_boss = enemy.is_boss();
        let xp = enemy.roll_xp(unit_sample(&mut self.rng));

        if poisoned {
            self.spread_poison(id, position);
        }
        if let Some(value) = xp {
            self.schedule_drop(PickupKind::XpGem, value, position);
        }
        if is_boss {
            self.boss_flow.on_boss_died(id, &mut self.bus);
        }
    }

    /// One hop: neighbours strictly inside the radius get a fresh application,
    /// nothing propagates further.
    fn spread_poison(&mut self, source: EntityId, position: Vec2Fixed) {
        let settings = self.config.status;
        let application = settings.spread_poison();
        let reach = settings.poison_spread_radius.saturating_mul(settings.poison_spread_radius);

        let mut targets = Vec::new();
        for id in self.enemies.sorted_ids() {
            if id == source {
                continue;
            }
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };
            if !enemy.is_alive() || enemy.position.distance_squared(position) >= reach {
                continue;
            }
            if let Some(applied) = enemy.apply_status(&application, &settings) {
                self.bus.publish(CombatEvent::StatusApplied {
                    enemy: id,
                    kind: applied.kind,
                    damage: applied.damage,
                    duration: applied.duration,
                });
                targets.push(id);
            }
        }
        if !targets.is_empty() {
            tracing::debug!(source, spread = targets.len(), "Poison spread");
            self.bus.publish(CombatEvent::PoisonSpread { source, targets });
        }
    }

    fn process_structure_death(&mut self, id: EntityId) {
        let Some(structure) = self.structures.get(id) else {
            return;
        };
        let position = structure.position;
        let sample = unit_sample(&mut self.rng);
        let Some(table_key) = structure.config().drop_table.as_deref() else {
            return;
        };
        let Some(table) = self.content.find_drop_table(table_key) else {
            tracing::warn!(structure = structure.key(), table = table_key, "Unknown drop table");
            return;
        };
        if let Some((kind, value)) = table.roll(sample) {
            self.schedule_drop(kind, value, position);
        }
    }

    fn schedule_drop(&mut self, kind: PickupKind, value: u32, position: Vec2Fixed) {
        let position = self.physics.clamp_position(position, self.config.pickup_margin);
        self.deferred.schedule(
            self.config.pickup_telegraph,
            DeferredTask::SpawnPickup(PickupSpawn { kind, position, value }),
        );
    }

    // ------------------------------------------------------------------
    // Hashing
    // ------------------------------------------------------------------

    /// Hash of the simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.deferred.now().to_bits().hash(&mut hasher);
        self.deferred.len().hash(&mut hasher);

        self.player.position.x.to_bits().hash(&mut hasher);
        self.player.position.y.to_bits().hash(&mut hasher);
        self.player.health().to_bits().hash(&mut hasher);
        self.player.xp().hash(&mut hasher);
        self.player.is_alive().hash(&mut hasher);

        for weapon in &self.weapons {
            weapon.key().hash(&mut hasher);
            weapon.cooldown_timer().to_bits().hash(&mut hasher);
            weapon.attacks().hash(&mut hasher);
        }

        self.enemies.len().hash(&mut hasher);
        for (id, enemy) in self.enemies.iter_sorted() {
            id.hash(&mut hasher);
            enemy.position.x.to_bits().hash(&mut hasher);
            enemy.position.y.to_bits().hash(&mut hasher);
            enemy.health().to_bits().hash(&mut hasher);
            enemy.status().len().hash(&mut hasher);
            enemy.behavior().state_name().hash(&mut hasher);
        }

        self.structures.len().hash(&mut hasher);
        for (id, structure) in self.structures.iter_sorted() {
            id.hash(&mut hasher);
            structure.hp().to_bits().hash(&mut hasher);
        }

        for (handle, projectile) in self.projectiles.iter_leased() {
            handle.hash(&mut hasher);
            projectile.is_active().hash(&mut hasher);
            projectile.position.x.to_bits().hash(&mut hasher);
            projectile.position.y.to_bits().hash(&mut hasher);
        }
        for (handle, pickup) in self.pickups.iter_leased() {
            handle.hash(&mut hasher);
            pickup.is_active().hash(&mut hasher);
        }

        self.boss_flow.pending_rewards().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EnemyConfig, WeaponConfig, WeaponType};

    fn content() -> ContentTables {
        ContentTables {
            weapons: vec![WeaponConfig {
                key: "sword".to_string(),
                weapon_type: WeaponType::Melee,
                damage: Fixed::from_num(20),
                cooldown_ms: Fixed::from_num(500),
                ..WeaponConfig::fallback()
            }],
            enemies: vec![EnemyConfig {
                key: "slime".to_string(),
                health: Fixed::from_num(15),
                xp_value: 3,
                xp_drop_chance: Fixed::ONE,
                ..EnemyConfig::fallback()
            }],
            ..ContentTables::default()
        }
    }

    fn ms(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_kill_drops_xp_after_telegraph() {
        let mut arena = Arena::new(ArenaConfig::default(), content());
        arena.equip_weapon("sword");
        let slime = arena.spawn_enemy("slime", Vec2Fixed::from_ints(1080, 1000));

        let events = arena.tick(ms(600));
        assert!(events.iter().any(|e| matches!(e, CombatEvent::EnemyDied { enemy, .. } if *enemy == slime)));
        assert!(!arena.enemies().contains(slime));
        assert_eq!(arena.pending_tasks(), 1);

        let events = arena.tick(ms(1000));
        assert!(events.iter().any(|e| e.name() == "pickup-spawned"));
        assert_eq!(arena.pickups().leased_count(), 1);
    }

    #[test]
    fn test_dead_player_stops_weapons() {
        let mut arena = Arena::new(ArenaConfig::default(), content());
        arena.equip_weapon("sword");
        arena.spawn_enemy("slime", Vec2Fixed::from_ints(1080, 1000));
        let _ = arena.player_mut().take_damage(ms(1000), DamageSource::EnemyContact);

        let events = arena.tick(ms(600));
        assert!(events.iter().all(|e| e.name() != "weapon-attack"));
        assert_eq!(arena.weapons()[0].attacks(), 0);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = || {
            let mut arena = Arena::new(ArenaConfig { seed: 42, ..ArenaConfig::default() }, content());
            arena.equip_weapon("sword");
            for i in 0..5 {
                arena.spawn_enemy("slime", Vec2Fixed::from_ints(900 + i * 40, 1000));
            }
            for _ in 0..30 {
                arena.tick(ms(16));
            }
            arena.state_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_unequip_releases_weapon() {
        let mut arena = Arena::new(ArenaConfig::default(), content());
        arena.equip_weapon("sword");
        assert!(arena.unequip_weapon("sword"));
        assert!(!arena.unequip_weapon("sword"));
        assert!(arena.weapons().is_empty());
    }
}
