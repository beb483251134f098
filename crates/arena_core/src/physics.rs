//! Physics collaborator seam.
//!
//! The combat core never integrates motion itself. It talks to a backend
//! through three narrow capabilities:
//!
//! - [`VelocityActuator`]: the only channel through which movement decisions
//!   become displacement.
//! - [`CollisionNotifier`]: which group pairs report overlaps; contacts come
//!   back from [`PhysicsBackend::step`].
//! - [`WorldBounds`]: safety clamp applied after movement.
//!
//! [`KinematicWorld`] is a small reference backend (circle bodies, no
//! broad phase) used by the headless tools, tests and benchmarks.

use crate::math::{Fixed, Vec2Fixed, MS_PER_SECOND};
use crate::pool::PoolHandle;
use crate::roster::EntityId;

/// Collision groups known to the combat core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionGroup {
    /// The player body.
    Player,
    /// Enemy bodies.
    Enemy,
    /// Projectiles and trail hazards (both factions).
    Projectile,
    /// Destructible structures.
    Structure,
    /// Pickups lying on the ground.
    Pickup,
}

/// What a physics body stands for in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyTag {
    /// The player.
    Player,
    /// An enemy from the roster.
    Enemy(EntityId),
    /// A pooled projectile.
    Projectile(PoolHandle),
    /// A structure from the roster.
    Structure(EntityId),
    /// A pooled pickup.
    Pickup(PoolHandle),
}

impl BodyTag {
    /// Collision group of this tag.
    #[must_use]
    pub const fn group(self) -> CollisionGroup {
        match self {
            Self::Player => CollisionGroup::Player,
            Self::Enemy(_) => CollisionGroup::Enemy,
            Self::Projectile(_) => CollisionGroup::Projectile,
            Self::Structure(_) => CollisionGroup::Structure,
            Self::Pickup(_) => CollisionGroup::Pickup,
        }
    }
}

/// Opaque handle to a backend body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// One overlapping pair reported for a frame.
///
/// `a` belongs to the first group of the registered pair, `b` to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Body from the first registered group.
    pub a: BodyTag,
    /// Body from the second registered group.
    pub b: BodyTag,
}

/// Overlap shapes used for single-tick melee tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect {
        /// Centre.
        center: Vec2Fixed,
        /// Half width and half height.
        half_extents: Vec2Fixed,
    },
    /// Circle.
    Circle {
        /// Centre.
        center: Vec2Fixed,
        /// Radius.
        radius: Fixed,
    },
}

impl Shape {
    /// Centre of the shape.
    #[must_use]
    pub const fn center(&self) -> Vec2Fixed {
        match self {
            Self::Rect { center, .. } | Self::Circle { center, .. } => *center,
        }
    }

    /// Whether the shape overlaps a circle body.
    #[must_use]
    pub fn overlaps_circle(&self, point: Vec2Fixed, radius: Fixed) -> bool {
        match *self {
            Self::Circle { center, radius: r } => {
                let reach = r + radius;
                center.distance_squared(point) < reach.saturating_mul(reach)
            }
            Self::Rect {
                center,
                half_extents,
            } => {
                let min = center - half_extents;
                let max = center + half_extents;
                let closest = Vec2Fixed::new(point.x.clamp(min.x, max.x), point.y.clamp(min.y, max.y));
                closest.distance_squared(point) <= radius.saturating_mul(radius)
            }
        }
    }
}

/// Sets body velocities (units per second).
pub trait VelocityActuator {
    /// Assign a velocity to a body.
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2Fixed);
}

/// Declares which group pairs report overlaps.
pub trait CollisionNotifier {
    /// Report overlaps between bodies of `a` and bodies of `b`.
    fn register_overlap(&mut self, a: CollisionGroup, b: CollisionGroup);
}

/// Playable area query.
pub trait WorldBounds {
    /// Clamp a position so it lies at least `margin` inside the bounds.
    fn clamp_position(&self, position: Vec2Fixed, margin: Fixed) -> Vec2Fixed;
}

/// Everything the arena needs from a physics backend.
pub trait PhysicsBackend: VelocityActuator + CollisionNotifier + WorldBounds {
    /// Create a body and return its handle.
    fn spawn_body(&mut self, tag: BodyTag, position: Vec2Fixed, radius: Fixed) -> BodyHandle;

    /// Re-purpose an existing body for a new owner (pooled reuse).
    fn reset_body(&mut self, body: BodyHandle, tag: BodyTag, position: Vec2Fixed, radius: Fixed);

    /// Enable or disable a body. Disabled bodies never move or collide.
    fn set_enabled(&mut self, body: BodyHandle, enabled: bool);

    /// Teleport a body.
    fn set_position(&mut self, body: BodyHandle, position: Vec2Fixed);

    /// Current position of a body.
    fn position(&self, body: BodyHandle) -> Option<Vec2Fixed>;

    /// Current velocity of a body.
    fn velocity(&self, body: BodyHandle) -> Option<Vec2Fixed>;

    /// Integrate `delta_ms` and return this frame's overlapping pairs.
    fn step(&mut self, delta_ms: Fixed) -> Vec<Contact>;
}

#[derive(Debug, Clone)]
struct Body {
    tag: BodyTag,
    position: Vec2Fixed,
    velocity: Vec2Fixed,
    radius: Fixed,
    enabled: bool,
}

/// Reference kinematic backend.
#[derive(Debug, Clone)]
pub struct KinematicWorld {
    bodies: Vec<Body>,
    pairs: Vec<(CollisionGroup, CollisionGroup)>,
    min: Vec2Fixed,
    max: Vec2Fixed,
}

impl KinematicWorld {
    /// Create a world spanning `min..=max`.
    #[must_use]
    pub fn new(min: Vec2Fixed, max: Vec2Fixed) -> Self {
        Self {
            bodies: Vec::new(),
            pairs: Vec::new(),
            min,
            max,
        }
    }

    /// Number of bodies ever created.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether a body is enabled.
    #[must_use]
    pub fn is_enabled(&self, body: BodyHandle) -> bool {
        self.bodies.get(body.0 as usize).is_some_and(|b| b.enabled)
    }

    fn body_mut(&mut self, body: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(body.0 as usize)
    }
}

impl VelocityActuator for KinematicWorld {
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2Fixed) {
        if let Some(b) = self.body_mut(body) {
            b.velocity = velocity;
        }
    }
}

impl CollisionNotifier for KinematicWorld {
    fn register_overlap(&mut self, a: CollisionGroup, b: CollisionGroup) {
        if !self.pairs.contains(&(a, b)) {
            self.pairs.push((a, b));
        }
    }
}

impl WorldBounds for KinematicWorld {
    fn clamp_position(&self, position: Vec2Fixed, margin: Fixed) -> Vec2Fixed {
        let lo_x = self.min.x + margin;
        let lo_y = self.min.y + margin;
        let hi_x = (self.max.x - margin).max(lo_x);
        let hi_y = (self.max.y - margin).max(lo_y);
        Vec2Fixed::new(position.x.clamp(lo_x, hi_x), position.y.clamp(lo_y, hi_y))
    }
}

impl PhysicsBackend for KinematicWorld {
    fn spawn_body(&mut self, tag: BodyTag, position: Vec2Fixed, radius: Fixed) -> BodyHandle {
        let handle = BodyHandle(u32::try_from(self.bodies.len()).unwrap_or(u32::MAX));
        self.bodies.push(Body {
            tag,
            position,
            velocity: Vec2Fixed::ZERO,
            radius,
            enabled: true,
        });
        handle
    }

    fn reset_body(&mut self, body: BodyHandle, tag: BodyTag, position: Vec2Fixed, radius: Fixed) {
        if let Some(b) = self.body_mut(body) {
            *b = Body {
                tag,
                position,
                velocity: Vec2Fixed::ZERO,
                radius,
                enabled: true,
            };
        }
    }

    fn set_enabled(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(b) = self.body_mut(body) {
            b.enabled = enabled;
            if !enabled {
                b.velocity = Vec2Fixed::ZERO;
            }
        }
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2Fixed) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2Fixed> {
        self.bodies.get(body.0 as usize).map(|b| b.position)
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec2Fixed> {
        self.bodies.get(body.0 as usize).map(|b| b.velocity)
    }

    fn step(&mut self, delta_ms: Fixed) -> Vec<Contact> {
        let seconds = delta_ms / Fixed::from_num(MS_PER_SECOND);
        let (min, max) = (self.min, self.max);
        for body in self.bodies.iter_mut().filter(|b| b.enabled) {
            let moved = body.position + body.velocity.scale(seconds);
            body.position = Vec2Fixed::new(moved.x.clamp(min.x, max.x), moved.y.clamp(min.y, max.y));
        }

        let mut contacts = Vec::new();
        for &(group_a, group_b) in &self.pairs {
            for (i, a) in self.bodies.iter().enumerate() {
                if !a.enabled || a.tag.group() != group_a {
                    continue;
                }
                for (j, b) in self.bodies.iter().enumerate() {
                    if i == j || !b.enabled || b.tag.group() != group_b {
                        continue;
                    }
                    let reach = a.radius + b.radius;
                    if a.position.distance_squared(b.position) < reach.saturating_mul(reach) {
                        contacts.push(Contact { a: a.tag, b: b.tag });
                    }
                }
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> KinematicWorld {
        KinematicWorld::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(1000, 1000))
    }

    #[test]
    fn test_step_integrates_units_per_second() {
        let mut w = world();
        let body = w.spawn_body(BodyTag::Player, Vec2Fixed::from_ints(100, 100), Fixed::from_num(10));
        w.set_velocity(body, Vec2Fixed::from_ints(200, 0));
        w.step(Fixed::from_num(500));
        assert_eq!(w.position(body), Some(Vec2Fixed::from_ints(200, 100)));
    }

    #[test]
    fn test_contacts_only_for_registered_pairs() {
        let mut w = world();
        w.spawn_body(BodyTag::Player, Vec2Fixed::from_ints(100, 100), Fixed::from_num(10));
        w.spawn_body(BodyTag::Enemy(1), Vec2Fixed::from_ints(105, 100), Fixed::from_num(10));

        assert!(w.step(Fixed::ZERO).is_empty());

        w.register_overlap(CollisionGroup::Player, CollisionGroup::Enemy);
        let contacts = w.step(Fixed::ZERO);
        assert_eq!(
            contacts,
            vec![Contact {
                a: BodyTag::Player,
                b: BodyTag::Enemy(1)
            }]
        );
    }

    #[test]
    fn test_disabled_bodies_never_collide() {
        let mut w = world();
        w.register_overlap(CollisionGroup::Player, CollisionGroup::Enemy);
        w.spawn_body(BodyTag::Player, Vec2Fixed::from_ints(100, 100), Fixed::from_num(10));
        let enemy = w.spawn_body(BodyTag::Enemy(1), Vec2Fixed::from_ints(100, 100), Fixed::from_num(10));
        w.set_enabled(enemy, false);
        assert!(w.step(Fixed::ZERO).is_empty());
    }

    #[test]
    fn test_clamp_position_with_margin() {
        let w = world();
        let clamped = w.clamp_position(Vec2Fixed::from_ints(-50, 2000), Fixed::from_num(10));
        assert_eq!(clamped, Vec2Fixed::from_ints(10, 990));
    }

    #[test]
    fn test_rect_overlap() {
        let rect = Shape::Rect {
            center: Vec2Fixed::from_ints(100, 100),
            half_extents: Vec2Fixed::from_ints(50, 20),
        };
        assert!(rect.overlaps_circle(Vec2Fixed::from_ints(140, 100), Fixed::from_num(5)));
        assert!(rect.overlaps_circle(Vec2Fixed::from_ints(155, 100), Fixed::from_num(6)));
        assert!(!rect.overlaps_circle(Vec2Fixed::from_ints(100, 140), Fixed::from_num(5)));
    }

    #[test]
    fn test_circle_overlap() {
        let circle = Shape::Circle {
            center: Vec2Fixed::ZERO,
            radius: Fixed::from_num(100),
        };
        assert!(circle.overlaps_circle(Vec2Fixed::from_ints(105, 0), Fixed::from_num(10)));
        assert!(!circle.overlaps_circle(Vec2Fixed::from_ints(115, 0), Fixed::from_num(10)));
    }
}
