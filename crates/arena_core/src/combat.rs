//! Damage routing and collision resolution.
//!
//! [`CombatWorld`] bundles the mutable session state a hit can touch. Weapon
//! strategies use it for melee swings; [`CombatSystem`] uses it to turn the
//! physics collaborator's contacts into damage.
//!
//! Every handler re-checks that both sides are still active before doing
//! anything: an enemy killed earlier in the same tick, or a projectile that
//! already resolved its hit, silently ignores further contacts.

use rand_chacha::ChaCha8Rng;

use crate::enemy::{DamageOutcome, Enemy, Knockback, StatusApplication, StatusSettings};
use crate::events::{CombatEvent, DamageSource, EventBus, HitboxId};
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::{BodyTag, CollisionGroup, CollisionNotifier, Contact, PhysicsBackend};
use crate::pickup::{Pickup, PickupKind};
use crate::player::{Player, PlayerHit};
use crate::pool::{ObjectPool, PoolHandle};
use crate::projectile::{Faction, Projectile};
use crate::roster::{EntityId, Roster};
use crate::structure::Structure;

/// Heal granted by a health kit with no value.
pub const DEFAULT_HEALTH_KIT: u32 = 20;

/// Something that died this tick and still needs death processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casualty {
    /// An enemy.
    Enemy(EntityId),
    /// A structure.
    Structure(EntityId),
}

/// One resolved hit against an enemy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Damage to subtract.
    pub damage: Fixed,
    /// Whether the roll was critical.
    pub is_critical: bool,
    /// Push applied after the damage.
    pub knockback: Knockback,
    /// Status effect applied before the damage.
    pub elemental: Option<StatusApplication>,
    /// Reported source.
    pub source: DamageSource,
    /// Where the hit came from (knockback pushes away from here).
    pub origin: Vec2Fixed,
}

/// Mutable session state reachable from a hit.
pub struct CombatWorld<'a> {
    /// Enemy roster.
    pub enemies: &'a mut Roster<Enemy>,
    /// Structure roster.
    pub structures: &'a mut Roster<Structure>,
    /// Shared projectile pool.
    pub projectiles: &'a mut ObjectPool<Projectile>,
    /// Pickup pool.
    pub pickups: &'a mut ObjectPool<Pickup>,
    /// Physics collaborator.
    pub physics: &'a mut dyn PhysicsBackend,
    /// Session event bus.
    pub bus: &'a mut EventBus,
    /// Session RNG (crit rolls).
    pub rng: &'a mut ChaCha8Rng,
    /// Status engine tuning.
    pub status: &'a StatusSettings,
    /// Deaths awaiting processing.
    pub casualties: &'a mut Vec<Casualty>,
    /// Next melee hitbox id.
    pub next_hitbox: &'a mut HitboxId,
}

impl CombatWorld<'_> {
    /// Allocate a session-unique hitbox id.
    pub fn allocate_hitbox(&mut self) -> HitboxId {
        let id = *self.next_hitbox;
        *self.next_hitbox += 1;
        id
    }

    /// Apply a hit to an enemy: elemental effect, then damage, then knockback.
    pub fn hit_enemy(&mut self, id: EntityId, hit: &Hit) -> DamageOutcome {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        if !enemy.is_alive() {
            return DamageOutcome::Ignored;
        }

        if let Some(application) = &hit.elemental {
            if let Some(applied) = enemy.apply_status(application, self.status) {
                self.bus.publish(CombatEvent::StatusApplied {
                    enemy: id,
                    kind: applied.kind,
                    damage: applied.damage,
                    duration: applied.duration,
                });
            }
        }

        let outcome = self.damage_enemy(id, hit.damage, hit.is_critical, hit.source);
        if outcome == DamageOutcome::Damaged {
            if let Some(enemy) = self.enemies.get_mut(id) {
                if let (Some(velocity), Some(body)) = (enemy.knock_back(hit.origin, hit.knockback), enemy.body) {
                    self.physics.set_velocity(body, velocity);
                }
            }
        }
        outcome
    }

    /// Subtract health from an enemy and publish what happened.
    ///
    /// Used directly for damage-over-time ticks, which never re-apply effects.
    pub fn damage_enemy(&mut self, id: EntityId, amount: Fixed, is_critical: bool, source: DamageSource) -> DamageOutcome {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = enemy.take_damage(amount);
        if outcome == DamageOutcome::Ignored {
            return outcome;
        }

        self.bus.publish(CombatEvent::EnemyDamaged {
            enemy: id,
            amount,
            is_critical,
            source,
        });
        if enemy.is_boss() {
            self.bus.publish(CombatEvent::BossHealthChanged {
                enemy: id,
                health: enemy.health().max(Fixed::ZERO),
                max_health: enemy.max_health(),
            });
            if enemy.check_enrage() {
                tracing::debug!(enemy = id, "Boss enraged");
                self.bus.publish(CombatEvent::BossEnraged { enemy: id });
            }
        }

        if outcome == DamageOutcome::Killed && enemy.die() {
            if let Some(body) = enemy.body {
                self.physics.set_enabled(body, false);
            }
            self.bus.publish(CombatEvent::EnemyDied {
                enemy: id,
                position: enemy.position,
                is_boss: enemy.is_boss(),
            });
            self.casualties.push(Casualty::Enemy(id));
        }
        outcome
    }

    /// Subtract hit points from a structure and publish what happened.
    pub fn hit_structure(&mut self, id: EntityId, amount: Fixed) -> DamageOutcome {
        let Some(structure) = self.structures.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = structure.take_damage(amount);
        if outcome == DamageOutcome::Ignored {
            return outcome;
        }
        self.bus.publish(CombatEvent::StructureDamaged {
            structure: id,
            amount,
            hp: structure.hp(),
        });
        if outcome == DamageOutcome::Killed && structure.die() {
            if let Some(body) = structure.body {
                self.physics.set_enabled(body, false);
            }
            self.bus.publish(CombatEvent::StructureDestroyed {
                structure: id,
                key: structure.key().to_string(),
                position: structure.position,
            });
            self.casualties.push(Casualty::Structure(id));
        }
        outcome
    }
}

/// Publish the events of a player hit.
pub fn publish_player_hit(bus: &mut EventBus, hit: PlayerHit) {
    bus.publish(CombatEvent::PlayerDamaged {
        amount: hit.amount,
        health: hit.health,
        source: hit.source,
    });
    if hit.died {
        bus.publish(CombatEvent::PlayerDied);
    }
}

/// Collision wiring between the physics collaborator and damage application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatSystem {
    resolved: u64,
}

impl CombatSystem {
    /// Group pairs whose overlaps matter to combat.
    pub const OVERLAPS: [(CollisionGroup, CollisionGroup); 5] = [
        (CollisionGroup::Player, CollisionGroup::Enemy),
        (CollisionGroup::Projectile, CollisionGroup::Enemy),
        (CollisionGroup::Player, CollisionGroup::Projectile),
        (CollisionGroup::Projectile, CollisionGroup::Structure),
        (CollisionGroup::Player, CollisionGroup::Pickup),
    ];

    /// Register every combat overlap with the notifier.
    pub fn new(notifier: &mut dyn CollisionNotifier) -> Self {
        for (a, b) in Self::OVERLAPS {
            notifier.register_overlap(a, b);
        }
        Self::default()
    }

    /// Contacts that produced an effect so far.
    #[must_use]
    pub const fn resolved(&self) -> u64 {
        self.resolved
    }

    /// Route one frame's contacts, in order.
    pub fn resolve(&mut self, contacts: &[Contact], world: &mut CombatWorld<'_>, player: &mut Player) {
        for contact in contacts {
            let handled = match (contact.a, contact.b) {
                (BodyTag::Player, BodyTag::Enemy(enemy)) => Self::on_player_hit_enemy(world, player, enemy),
                (BodyTag::Projectile(projectile), BodyTag::Enemy(enemy)) => {
                    Self::on_projectile_hit_enemy(world, projectile, enemy)
                }
                (BodyTag::Player, BodyTag::Projectile(projectile)) => {
                    Self::on_projectile_hit_player(world, player, projectile)
                }
                (BodyTag::Projectile(projectile), BodyTag::Structure(structure)) => {
                    Self::on_projectile_hit_structure(world, projectile, structure)
                }
                (BodyTag::Player, BodyTag::Pickup(pickup)) => Self::on_player_collect(world, player, pickup),
                _ => false,
            };
            if handled {
                self.resolved += 1;
            }
        }
    }

    fn on_player_hit_enemy(world: &mut CombatWorld<'_>, player: &mut Player, id: EntityId) -> bool {
        let Some(enemy) = world.enemies.get(id).filter(|e| e.is_alive()) else {
            return false;
        };
        match player.take_damage(enemy.damage(), DamageSource::EnemyContact) {
            Some(hit) => {
                publish_player_hit(world.bus, hit);
                true
            }
            None => false,
        }
    }

    fn on_projectile_hit_enemy(world: &mut CombatWorld<'_>, handle: PoolHandle, id: EntityId) -> bool {
        if !world.enemies.get(id).is_some_and(Enemy::is_alive) {
            return false;
        }
        let Some(projectile) = world
            .projectiles
            .get_mut(handle)
            .filter(|p| p.is_active() && p.faction() == Faction::Player)
        else {
            return false;
        };
        let origin = projectile.position;
        let Some(payload) = projectile.hit() else {
            return false;
        };
        let hit = Hit {
            damage: payload.damage,
            is_critical: payload.is_critical,
            knockback: payload.knockback,
            elemental: payload.elemental,
            source: DamageSource::Projectile,
            origin,
        };
        world.hit_enemy(id, &hit);
        true
    }

    fn on_projectile_hit_player(world: &mut CombatWorld<'_>, player: &mut Player, handle: PoolHandle) -> bool {
        if !player.is_alive() {
            return false;
        }
        let Some(projectile) = world
            .projectiles
            .get_mut(handle)
            .filter(|p| p.is_active() && p.faction() == Faction::Enemy)
        else {
            return false;
        };
        let Some(payload) = projectile.hit() else {
            return false;
        };
        if let Some(hit) = player.take_damage(payload.damage, DamageSource::EnemyProjectile) {
            publish_player_hit(world.bus, hit);
        }
        true
    }

    fn on_projectile_hit_structure(world: &mut CombatWorld<'_>, handle: PoolHandle, id: EntityId) -> bool {
        if !world.structures.get(id).is_some_and(Structure::is_active) {
            return false;
        }
        let Some(projectile) = world
            .projectiles
            .get_mut(handle)
            .filter(|p| p.is_active() && p.faction() == Faction::Player)
        else {
            return false;
        };
        let Some(payload) = projectile.hit() else {
            return false;
        };
        world.hit_structure(id, payload.damage);
        true
    }

    fn on_player_collect(world: &mut CombatWorld<'_>, player: &mut Player, handle: PoolHandle) -> bool {
        if !player.is_alive() {
            return false;
        }
        let Some((kind, value)) = world.pickups.get_mut(handle).and_then(Pickup::collect) else {
            return false;
        };
        if let Some(body) = world.pickups.get(handle).and_then(|p| p.body) {
            world.physics.set_enabled(body, false);
        }
        match kind {
            PickupKind::XpGem => player.gain_xp(value),
            PickupKind::HealthKit => {
                let amount = if value > 0 { value } else { DEFAULT_HEALTH_KIT };
                player.heal(Fixed::from_num(amount));
            }
            PickupKind::Magnet | PickupKind::TreasureChest => {}
        }
        world.bus.publish(CombatEvent::PickupCollected {
            pickup: handle,
            kind,
            value,
        });
        true
    }
}
