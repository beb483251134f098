//! Fixed-point math utilities for the combat simulation.
//!
//! Positions, speeds, stat multipliers and timers all use fixed-point
//! arithmetic so that two sessions fed the same seed and inputs produce
//! identical results. Timers are expressed in fixed-point milliseconds.

use fixed::types::I32F32;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Milliseconds per second, used to turn per-second speeds into per-tick motion.
pub const MS_PER_SECOND: i32 = 1000;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers written as plain decimals.
///
/// Content tables are authored by hand, so values such as `0.4` or `250`
/// are read as decimals and converted once at load time.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

/// Serde support for `Option<Fixed>` written as plain decimals.
pub mod option_decimal_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_num::<f64>()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<f64>::deserialize(deserializer)?;
        opt.map(|value| {
            Fixed::checked_from_num(value).ok_or_else(|| {
                serde::de::Error::custom(format!("{value} is out of fixed-point range"))
            })
        })
        .transpose()
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x
            .saturating_mul(other.x)
            .saturating_add(self.y.saturating_mul(other.y))
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.x.saturating_mul(self.x).saturating_add(self.y.saturating_mul(self.y)))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    #[must_use]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Returns true when both components are zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == Fixed::ZERO && self.y == Fixed::ZERO
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        // Squared length of anything past this saturates; shrink first.
        let largest = self.x.saturating_abs().max(self.y.saturating_abs());
        if largest > Fixed::from_num(NORMALIZE_LIMIT) {
            return Self::new(self.x / largest, self.y / largest).normalize();
        }

        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }

    /// Unit direction from `self` toward `target`.
    ///
    /// Returns `None` when the two points coincide; callers skip the
    /// movement or velocity assignment for that tick instead of producing
    /// a degenerate direction.
    #[must_use]
    pub fn direction_to(self, target: Self) -> Option<Self> {
        let diff = target - self;
        if diff.is_zero() {
            return None;
        }
        let dir = diff.normalize();
        if dir.is_zero() {
            None
        } else {
            Some(dir)
        }
    }
}

/// Largest component `normalize` squares directly.
const NORMALIZE_LIMIT: i32 = 1 << 14;

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..64 {
        let mid = low + (high - low) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Uniform sample in `[0, 1)` drawn straight into the fractional bits.
pub fn unit_sample(rng: &mut impl RngCore) -> Fixed {
    Fixed::from_bits(i64::from(rng.next_u32()))
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Neg for Vec2Fixed {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_distance() {
        let a = Vec2Fixed::from_ints(0, 0);
        let b = Vec2Fixed::from_ints(3, 4);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((a.distance(b) - Fixed::from_num(5)).abs() < epsilon);
    }

    #[test]
    fn test_vec2_normalize() {
        let v = Vec2Fixed::from_ints(3, 4);
        let norm = v.normalize();

        let len_sq = norm.dot(norm);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!(
            (len_sq - Fixed::ONE).abs() < epsilon,
            "normalized vector length² should be ~1, got {:?}",
            len_sq
        );

        // norm.x * 4 should equal norm.y * 3
        let ratio_diff = (norm.x * Fixed::from_num(4)) - (norm.y * Fixed::from_num(3));
        assert!(ratio_diff.abs() < epsilon, "direction not preserved: {:?}", ratio_diff);
    }

    #[test]
    fn test_direction_to_coincident_points() {
        let p = Vec2Fixed::from_ints(7, -2);
        assert_eq!(p.direction_to(p), None);
    }

    #[test]
    fn test_direction_to_axis() {
        let from = Vec2Fixed::from_ints(10, 10);
        let dir = from.direction_to(Vec2Fixed::from_ints(20, 10)).unwrap();
        assert_eq!(dir.y, Fixed::ZERO);
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((dir.x - Fixed::ONE).abs() < epsilon);
    }

    #[test]
    fn test_dot_saturates() {
        let v = Vec2Fixed::from_ints(50_000, 50_000);
        assert_eq!(v.dot(v), Fixed::MAX);
    }

    #[test]
    fn test_direction_to_across_huge_distance() {
        let from = Vec2Fixed::from_ints(-40_000, 0);
        let dir = from.direction_to(Vec2Fixed::from_ints(40_000, 60_000)).unwrap();
        let epsilon = Fixed::ONE / Fixed::from_num(1000);
        assert!((dir.x - Fixed::from_num(0.8)).abs() < epsilon, "x = {:?}", dir.x);
        assert!((dir.y - Fixed::from_num(0.6)).abs() < epsilon, "y = {:?}", dir.y);
    }

    #[test]
    fn test_perp_is_orthogonal() {
        let v = Vec2Fixed::from_ints(2, 5);
        assert_eq!(v.dot(v.perp()), Fixed::ZERO);
    }

    #[test]
    fn test_unit_sample_range() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        for _ in 0..256 {
            let sample = unit_sample(&mut rng);
            assert!(sample >= Fixed::ZERO && sample < Fixed::ONE);
        }
    }

    #[test]
    fn test_decimal_serde_round_values() {
        let v: Vec2Fixed = ron::from_str("(x: 1.5, y: -250)").unwrap();
        assert_eq!(v.x, Fixed::from_num(1.5));
        assert_eq!(v.y, Fixed::from_num(-250));
    }
}
