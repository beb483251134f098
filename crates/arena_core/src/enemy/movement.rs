//! Turns behavior output into an enemy velocity.

use crate::enemy::behavior::MovementVector;
use crate::math::{Fixed, Vec2Fixed};

/// Default enemy speed when a template carries none.
pub const DEFAULT_ENEMY_SPEED: i32 = 100;

/// An impulse that overrides normal movement for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Knockback {
    /// Velocity magnitude of the push.
    pub force: Fixed,
    /// How long normal movement is suspended, ms.
    pub duration: Fixed,
}

impl Knockback {
    /// Whether this knockback does anything.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.force <= Fixed::ZERO || self.duration <= Fixed::ZERO
    }

    /// Scale the force.
    #[must_use]
    pub fn scaled(self, factor: Fixed) -> Self {
        Self {
            force: self.force * factor,
            duration: self.duration,
        }
    }
}

/// Inputs of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementInput {
    /// Behavior output.
    pub vector: MovementVector,
    /// Enemy base speed, units per second.
    pub base_speed: Fixed,
    /// Status speed factor (freeze, enrage).
    pub status_multiplier: Fixed,
    /// Stunned or telegraphing: stand still.
    pub halted: bool,
}

/// Per-enemy movement state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyMotion {
    knockback_timer: Fixed,
}

impl EnemyMotion {
    /// Fresh state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a knockback is currently overriding movement.
    #[must_use]
    pub fn is_knocked_back(&self) -> bool {
        self.knockback_timer > Fixed::ZERO
    }

    /// Start a knockback pushing away from `source`.
    ///
    /// Returns the velocity to assign, or `None` when there is nothing to
    /// apply or the push direction is undefined (coincident points).
    pub fn apply_knockback(&mut self, source: Vec2Fixed, position: Vec2Fixed, knockback: Knockback) -> Option<Vec2Fixed> {
        if knockback.is_none() {
            return None;
        }
        let Some(direction) = source.direction_to(position) else {
            tracing::warn!("Knockback skipped: source and target coincide");
            return None;
        };
        self.knockback_timer = knockback.duration;
        Some(direction.scale(knockback.force))
    }

    /// Compute this tick's velocity.
    ///
    /// `None` means leave the current velocity untouched (knockback in
    /// progress).
    pub fn step(&mut self, delta: Fixed, input: MovementInput) -> Option<Vec2Fixed> {
        if self.knockback_timer > Fixed::ZERO {
            self.knockback_timer -= delta;
            return None;
        }
        if input.halted || input.vector.is_still() {
            return Some(Vec2Fixed::ZERO);
        }
        let speed = input.base_speed * input.vector.speed * input.status_multiplier;
        Some(input.vector.direction.scale(speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn walking_east() -> MovementInput {
        MovementInput {
            vector: MovementVector::new(Vec2Fixed::from_ints(1, 0), Fixed::from_num(1.5)),
            base_speed: ms(100),
            status_multiplier: Fixed::from_num(0.4),
            halted: false,
        }
    }

    #[test]
    fn test_velocity_composition() {
        let mut motion = EnemyMotion::new();
        let velocity = motion.step(ms(16), walking_east()).unwrap();
        assert_eq!(velocity, Vec2Fixed::new(ms(60), Fixed::ZERO));
    }

    #[test]
    fn test_halted_stands_still() {
        let mut motion = EnemyMotion::new();
        let input = MovementInput {
            halted: true,
            ..walking_east()
        };
        assert_eq!(motion.step(ms(16), input), Some(Vec2Fixed::ZERO));
    }

    #[test]
    fn test_knockback_has_priority() {
        let mut motion = EnemyMotion::new();
        let push = motion.apply_knockback(
            Vec2Fixed::ZERO,
            Vec2Fixed::from_ints(10, 0),
            Knockback {
                force: ms(150),
                duration: ms(50),
            },
        );
        assert_eq!(push, Some(Vec2Fixed::new(ms(150), Fixed::ZERO)));
        assert!(motion.step(ms(30), walking_east()).is_none());
        assert!(motion.step(ms(30), walking_east()).is_none());
        assert!(motion.step(ms(30), walking_east()).is_some());
    }

    #[test]
    fn test_knockback_from_same_point_is_skipped() {
        let mut motion = EnemyMotion::new();
        let p = Vec2Fixed::from_ints(5, 5);
        let push = motion.apply_knockback(
            p,
            p,
            Knockback {
                force: ms(150),
                duration: ms(50),
            },
        );
        assert!(push.is_none());
        assert!(!motion.is_knocked_back());
    }
}
