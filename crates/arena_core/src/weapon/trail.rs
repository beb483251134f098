//! Trail weapons: pooled projectiles fired along the line to the target.

use crate::combat::CombatWorld;
use crate::events::CombatEvent;
use crate::math::Fixed;
use crate::pool::PoolHandle;
use crate::projectile::{launch, retire, Faction, ProjectileSpawn};

use super::strategy::{StrategyContext, Target};
use super::calculate_damage;

/// Handles of the trails a weapon currently owns.
#[derive(Debug, Clone, Default)]
pub struct TrailStrategy {
    trails: Vec<PoolHandle>,
}

impl TrailStrategy {
    /// Empty strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trails still leased.
    #[must_use]
    pub fn live_trails(&self) -> usize {
        self.trails.len()
    }

    /// Owned handles.
    #[must_use]
    pub fn handles(&self) -> &[PoolHandle] {
        &self.trails
    }

    /// Fire one trail at `target`.
    pub fn attack(&mut self, target: Target, ctx: &StrategyContext<'_>, world: &mut CombatWorld<'_>) {
        let wielder = ctx.wielder;
        let Some(direction) = wielder.position.direction_to(target.position) else {
            tracing::warn!(weapon = %ctx.config.key, target = target.id, "Target on top of the wielder, trail skipped");
            return;
        };

        let size = ctx.config.trail_size();
        let origin = wielder.position + direction.scale(size);
        let (damage, is_critical) = calculate_damage(ctx.current.damage, &wielder.stats, world.rng);
        let spawn = ProjectileSpawn {
            faction: Faction::Player,
            origin,
            velocity: direction.scale(ctx.current.trail_speed),
            damage,
            is_critical,
            knockback: ctx.config.knockback(),
            knockback_multiplier: wielder.stats.knockback,
            elemental: ctx.config.elemental_payload(ctx.current.dot_damage),
            lifetime: ctx.current.lifetime,
            radius: size,
        };
        let handle = launch(world.projectiles, world.physics, spawn);
        self.trails.push(handle);

        world.bus.publish(CombatEvent::WeaponShoot {
            weapon: ctx.config.key.clone(),
            projectile: handle,
            origin,
            direction,
        });
    }

    /// Release spent trails and age the rest.
    pub fn update(&mut self, delta: Fixed, world: &mut CombatWorld<'_>) {
        self.trails.retain(|&handle| {
            let alive = match world.projectiles.get_mut(handle) {
                Some(projectile) if projectile.is_active() => projectile.update(delta),
                Some(_) => false,
                None => return false,
            };
            if !alive {
                retire(world.projectiles, world.physics, handle);
            }
            alive
        });
    }

    /// Release every owned trail.
    pub fn teardown(&mut self, world: &mut CombatWorld<'_>) {
        for handle in self.trails.drain(..) {
            retire(world.projectiles, world.physics, handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::combat::Casualty;
    use crate::data::{EnemyConfig, WeaponConfig, WeaponType};
    use crate::enemy::{Enemy, EnemyBehavior, StatusKind, StatusSettings};
    use crate::events::{EventBus, HitboxId};
    use crate::math::Vec2Fixed;
    use crate::physics::KinematicWorld;
    use crate::pickup::Pickup;
    use crate::pool::ObjectPool;
    use crate::projectile::Projectile;
    use crate::roster::Roster;
    use crate::stats::ResolvedStats;
    use crate::structure::Structure;
    use crate::weapon::{CurrentStats, Wielder};

    struct Bench {
        enemies: Roster<Enemy>,
        structures: Roster<Structure>,
        projectiles: ObjectPool<Projectile>,
        pickups: ObjectPool<Pickup>,
        physics: KinematicWorld,
        bus: EventBus,
        rng: ChaCha8Rng,
        status: StatusSettings,
        casualties: Vec<Casualty>,
        next_hitbox: HitboxId,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                enemies: Roster::new(),
                structures: Roster::new(),
                projectiles: ObjectPool::with_capacity(2),
                pickups: ObjectPool::with_capacity(1),
                physics: KinematicWorld::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(2000, 2000)),
                bus: EventBus::new(),
                rng: ChaCha8Rng::seed_from_u64(9),
                status: StatusSettings::default(),
                casualties: Vec::new(),
                next_hitbox: 1,
            }
        }

        fn world(&mut self) -> CombatWorld<'_> {
            CombatWorld {
                enemies: &mut self.enemies,
                structures: &mut self.structures,
                projectiles: &mut self.projectiles,
                pickups: &mut self.pickups,
                physics: &mut self.physics,
                bus: &mut self.bus,
                rng: &mut self.rng,
                status: &self.status,
                casualties: &mut self.casualties,
                next_hitbox: &mut self.next_hitbox,
            }
        }
    }

    fn staff() -> WeaponConfig {
        WeaponConfig {
            key: "staff".to_string(),
            weapon_type: WeaponType::Trail,
            damage: Fixed::from_num(15),
            lifetime_ms: Some(Fixed::from_num(400)),
            trail_speed: Some(Fixed::from_num(400)),
            elemental: Some(StatusKind::Freeze),
            dot_duration_ms: Fixed::from_num(1500),
            ..WeaponConfig::fallback()
        }
    }

    #[test]
    fn test_trail_spawns_ahead_and_expires() {
        let mut bench = Bench::new();
        let target_id = bench.enemies.insert_with(|id| {
            Enemy::new(id, EnemyConfig::fallback(), EnemyBehavior::Idle, Vec2Fixed::from_ints(200, 100))
        });
        let config = staff();
        let wielder = Wielder {
            position: Vec2Fixed::from_ints(100, 100),
            stats: ResolvedStats::default(),
            alive: true,
        };
        let current = CurrentStats::resolve(&config, &wielder.stats);
        let ctx = StrategyContext {
            config: &config,
            current: &current,
            wielder: &wielder,
        };
        let mut trail = TrailStrategy::new();
        let target = Target {
            id: target_id,
            position: Vec2Fixed::from_ints(200, 100),
        };
        trail.attack(target, &ctx, &mut bench.world());

        let handle = trail.handles()[0];
        let projectile = bench.projectiles.get(handle).unwrap();
        let tolerance = Fixed::from_num(0.01);
        assert!(projectile.position.distance(Vec2Fixed::from_ints(110, 100)) < tolerance);
        assert!(projectile.velocity().distance(Vec2Fixed::from_ints(400, 0)) < tolerance);

        trail.update(Fixed::from_num(400), &mut bench.world());
        assert_eq!(trail.live_trails(), 1);
        trail.update(Fixed::from_num(16), &mut bench.world());
        assert_eq!(trail.live_trails(), 0);
        assert_eq!(bench.projectiles.leased_count(), 0);
    }

    #[test]
    fn test_coincident_target_skips_shot() {
        let mut bench = Bench::new();
        let config = staff();
        let wielder = Wielder {
            position: Vec2Fixed::from_ints(100, 100),
            stats: ResolvedStats::default(),
            alive: true,
        };
        let current = CurrentStats::resolve(&config, &wielder.stats);
        let ctx = StrategyContext {
            config: &config,
            current: &current,
            wielder: &wielder,
        };
        let mut trail = TrailStrategy::new();
        let target = Target {
            id: 1,
            position: wielder.position,
        };
        trail.attack(target, &ctx, &mut bench.world());
        assert_eq!(trail.live_trails(), 0);
        assert!(bench.bus.drain().is_empty());
    }
}
