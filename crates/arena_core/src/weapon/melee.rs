//! Melee swings.
//!
//! A swing places one overlap shape around the wielder, tests it against
//! live enemies and standing structures on the same tick, and keeps only a
//! teardown timer afterwards. `Wave` swings queue a larger secondary shape
//! that fires part-way through the animation.

use std::collections::BTreeSet;

use crate::combat::{CombatWorld, Hit};
use crate::data::{HitboxSize, MeleeBehavior};
use crate::events::{CombatEvent, DamageSource, HitboxId};
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::Shape;
use crate::roster::EntityId;

use super::strategy::{StrategyContext, Target};
use super::calculate_damage;

/// Half extent of the `Area360` square before area scaling.
pub const AREA_360_RADIUS: i32 = 100;
/// `Thrust` hitbox before area scaling.
pub const THRUST_HITBOX: (i32, i32) = (250, 60);
/// `Wave` primary hitbox before area scaling.
pub const WAVE_PRIMARY_HITBOX: (i32, i32) = (180, 120);
/// `Wave` secondary hitbox before area scaling.
pub const WAVE_SECONDARY_HITBOX: (i32, i32) = (220, 140);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Struck {
    Enemy(EntityId),
    Structure(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LiveHitbox {
    id: HitboxId,
    remaining: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWave {
    delay: Fixed,
    lifetime: Fixed,
    facing: Fixed,
}

/// Hitbox bookkeeping for a melee weapon.
#[derive(Debug, Clone, Default)]
pub struct MeleeStrategy {
    hitboxes: Vec<LiveHitbox>,
    waves: Vec<PendingWave>,
}

impl MeleeStrategy {
    /// Empty strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hitboxes not yet torn down.
    #[must_use]
    pub fn live_hitboxes(&self) -> usize {
        self.hitboxes.len()
    }

    /// Secondary waves still waiting to fire.
    #[must_use]
    pub fn pending_waves(&self) -> usize {
        self.waves.len()
    }

    /// Swing at `target`.
    pub fn attack(&mut self, target: Target, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        world.bus.publish(CombatEvent::WeaponAttack {
            weapon: ctx.config.key.clone(),
            target: target.id,
        });

        let stats = &ctx.wielder.stats;
        let duration = if stats.attack_speed > Fixed::ZERO {
            ctx.config.melee_anim_duration() / stats.attack_speed
        } else {
            ctx.config.melee_anim_duration()
        };
        let facing = if target.position.x < ctx.wielder.position.x {
            -Fixed::ONE
        } else {
            Fixed::ONE
        };

        let shape = primary_shape(ctx, facing);
        self.strike(shape, duration, ctx, world);

        if ctx.config.melee_behavior == MeleeBehavior::Wave {
            self.waves.push(PendingWave {
                delay: duration * Fixed::from_num(0.6),
                lifetime: duration * Fixed::from_num(0.4),
                facing,
            });
        }
    }

    /// Run down teardown timers, then fire due secondary waves.
    pub fn update(&mut self, delta: Fixed, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        self.hitboxes.retain_mut(|hitbox| {
            hitbox.remaining -= delta;
            if hitbox.remaining > Fixed::ZERO {
                return true;
            }
            world.bus.publish(CombatEvent::HitboxRemoved { hitbox: hitbox.id });
            false
        });

        let mut due = Vec::new();
        self.waves.retain_mut(|wave| {
            wave.delay -= delta;
            if wave.delay > Fixed::ZERO {
                return true;
            }
            due.push(*wave);
            false
        });
        if !ctx.wielder.alive {
            return;
        }
        for wave in due {
            let size = scaled(WAVE_SECONDARY_HITBOX, ctx.wielder.stats.area);
            let shape = front_rect(ctx.wielder.position, size, size.width / 2 * wave.facing);
            self.strike(shape, wave.lifetime, ctx, world);
        }
    }

    /// Tear down every live hitbox and drop pending waves.
    pub fn teardown(&mut self, world: &mut CombatWorld<'_>) {
        for hitbox in self.hitboxes.drain(..) {
            world.bus.publish(CombatEvent::HitboxRemoved { hitbox: hitbox.id });
        }
        self.waves.clear();
    }

    fn strike(&mut self, shape: Shape, lifetime: Fixed, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        let id = world.allocate_hitbox();
        world.bus.publish(CombatEvent::HitboxSpawned {
            weapon: ctx.config.key.clone(),
            hitbox: id,
            center: shape.center(),
        });
        let struck = resolve_overlaps(shape, ctx, world);
        tracing::trace!(weapon = %ctx.config.key, hitbox = id, struck, "Melee hitbox resolved");
        self.hitboxes.push(LiveHitbox { id, remaining: lifetime });
    }
}

fn scaled((width, height): (i32, i32), area: Fixed) -> HitboxSize {
    HitboxSize::new(width, height).scaled(area)
}

fn front_rect(origin: Vec2Fixed, size: HitboxSize, offset_x: Fixed) -> Shape {
    Shape::Rect {
        center: Vec2Fixed::new(origin.x + offset_x, origin.y),
        half_extents: Vec2Fixed::new(size.width / 2, size.height / 2),
    }
}

fn primary_shape(ctx: &StrategyContext<'_>, facing: Fixed) -> Shape {
    let origin = ctx.wielder.position;
    let area = ctx.wielder.stats.area;
    match ctx.config.melee_behavior {
        MeleeBehavior::FrontSwing => {
            let size = ctx.config.hitbox().scaled(area);
            let offset = if ctx.config.frontal_attack {
                size.width / 2
            } else {
                ctx.config.melee_offset_x.unwrap_or(Fixed::ZERO)
            };
            front_rect(origin, size, offset * facing)
        }
        MeleeBehavior::Area360 => {
            let r = Fixed::from_num(AREA_360_RADIUS) * area;
            Shape::Rect {
                center: origin,
                half_extents: Vec2Fixed::new(r, r),
            }
        }
        MeleeBehavior::Thrust => {
            let size = scaled(THRUST_HITBOX, area);
            front_rect(origin, size, size.width / 2 * facing)
        }
        MeleeBehavior::Wave => {
            let size = scaled(WAVE_PRIMARY_HITBOX, area);
            front_rect(origin, size, size.width / 2 * facing)
        }
    }
}

/// Damage everything under `shape` once. Returns how many targets were hit.
fn resolve_overlaps(shape: Shape, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) -> usize {
    let stats = &ctx.wielder.stats;
    let knockback = ctx.config.knockback().scaled(stats.knockback);
    let elemental = ctx.config.elemental_payload(ctx.current.dot_damage);
    let mut struck = BTreeSet::new();

    for id in world.enemies.sorted_ids() {
        let overlaps = world
            .enemies
            .get(id)
            .is_some_and(|e| e.is_alive() && shape.overlaps_circle(e.position, e.radius()));
        if !overlaps || !struck.insert(Struck::Enemy(id)) {
            continue;
        }
        let (damage, is_critical) = calculate_damage(ctx.current.damage, stats, world.rng);
        let hit = Hit {
            damage,
            is_critical,
            knockback,
            elemental: elemental.clone(),
            source: DamageSource::Melee,
            origin: ctx.wielder.position,
        };
        world.hit_enemy(id, &hit);
    }

    for id in world.structures.sorted_ids() {
        let overlaps = world
            .structures
            .get(id)
            .is_some_and(|s| s.is_active() && shape.overlaps_circle(s.position, s.radius()));
        if !overlaps || !struck.insert(Struck::Structure(id)) {
            continue;
        }
        let (damage, _) = calculate_damage(ctx.current.damage, stats, world.rng);
        world.hit_structure(id, damage);
    }

    struck.len()
}
