//! Geometry primitives: [`Vec3`] and [`Point`].
//!
//! [`Vec3`] is a world-space position or direction. The convention follows
//! the headset tracking space: `y` points up, `x` and `z` span the floor.
//! [`Point`] is an integer cell used for shelf layouts.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A 3D point or direction in world space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit vector pointing up.
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or [`Vec3::ZERO`] for a zero vector.
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// The vector projected onto the floor plane (`y` dropped).
    #[inline]
    pub fn flat(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Unsigned angle between two directions, in degrees `[0, 180]`.
    ///
    /// Returns 0 when either vector has zero length.
    pub fn angle_deg(self, other: Self) -> f32 {
        let denom = self.length() * other.length();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        let cos = (self.dot(other) / denom).clamp(-1.0, 1.0);
        cos.acos().to_degrees()
    }

    /// Signed turn angle on the floor plane from `self` to `other`, in
    /// degrees `(-180, 180]`.
    ///
    /// Positive values are counter-clockwise seen from above (a left turn
    /// when `x` is east and `z` is north).
    pub fn signed_yaw_deg(self, other: Self) -> f32 {
        let cross = self.x * other.z - self.z * other.x;
        let dot = self.x * other.x + self.z * other.z;
        if cross == 0.0 && dot == 0.0 {
            return 0.0;
        }
        cross.atan2(dot).to_degrees()
    }

    /// Move from `self` towards `target` by at most `max_step`.
    ///
    /// Returns `target` exactly once it is within reach.
    pub fn move_towards(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            target
        } else {
            self + delta / dist * max_step
        }
    }

    /// Whether every component is finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// --- trait impls for Vec3 ---

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f32; 3] {
    #[inline]
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer point, used for shelf dimensions and slot coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether `p` lies inside the half-open box `[0, self)`.
    #[inline]
    pub fn bounds(self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.x && p.y < self.y
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 8.0);
        assert_eq!(a + b, Vec3::new(5.0, 8.0, 11.0));
        assert_eq!(b - a, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!(close(a.distance(b), 5.0));
        assert!(close(b.distance(a), 5.0));
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        assert!(close(Vec3::new(0.0, 0.0, 7.0).normalized().z, 1.0));
    }

    #[test]
    fn angle_between_directions() {
        let east = Vec3::new(1.0, 0.0, 0.0);
        let north = Vec3::new(0.0, 0.0, 1.0);
        assert!(close(east.angle_deg(north), 90.0));
        assert!(close(east.angle_deg(-east), 180.0));
        assert!(close(east.angle_deg(east * 3.0), 0.0));
        assert_eq!(east.angle_deg(Vec3::ZERO), 0.0);
    }

    #[test]
    fn signed_yaw_left_is_positive() {
        let east = Vec3::new(1.0, 0.0, 0.0);
        let north = Vec3::new(0.0, 0.0, 1.0);
        let south = Vec3::new(0.0, 0.0, -1.0);
        assert!(close(east.signed_yaw_deg(north), 90.0));
        assert!(close(east.signed_yaw_deg(south), -90.0));
        // Height differences are ignored.
        assert!(close(east.signed_yaw_deg(Vec3::new(1.0, 5.0, 0.0)), 0.0));
    }

    #[test]
    fn move_towards_clamps_at_target() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(a.move_towards(b, 4.0), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(a.move_towards(b, 40.0), b);
    }

    #[test]
    fn point_bounds() {
        let dims = Point::new(5, 4);
        assert!(dims.bounds(Point::new(0, 0)));
        assert!(dims.bounds(Point::new(4, 3)));
        assert!(!dims.bounds(Point::new(5, 0)));
        assert!(!dims.bounds(Point::new(0, -1)));
        assert_eq!(Point::new(1, 2) + Point::new(3, 4), Point::new(4, 6));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn vec3_serializes_as_struct() {
        let v = Vec3::new(1.5, 0.0, -2.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":0.0,"z":-2.0}"#);
    }
}
