//! Geometry primitives for event positions and volume extents.

use serde::{Deserialize, Serialize};

/// A 3D vector in world coordinates (micrometers).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance2(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance2(other).sqrt()
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Largest component.
    #[must_use]
    pub fn max_element(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    /// True when every component is a finite number.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

/// Axis-aligned bounding box over event positions.
///
/// The empty box is represented with inverted corners so that inserting the
/// first point initializes both corners to it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// Builds the box enclosing all finite points in `points`.
    #[must_use]
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.insert(p);
        }
        bbox
    }

    /// Grows the box to contain `point`. Non-finite points are ignored.
    pub fn insert(&mut self, point: Vec3) {
        if !point.is_finite() {
            return;
        }
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Edge lengths; zero for an empty box.
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Longest edge; zero for an empty or degenerate (single point) box.
    #[must_use]
    pub fn max_dimension(&self) -> f32 {
        self.extent().max_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_distance() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.0, 2.0, 7.0);
        assert_eq!(a.distance2(b), 16.0);
        assert_eq!(a.distance(b), 4.0);
    }

    #[test]
    fn test_aabb_insert_and_extent() {
        let mut bbox = Aabb::empty();
        assert!(bbox.is_empty());
        bbox.insert(Vec3::new(1.0, -1.0, 0.0));
        bbox.insert(Vec3::new(3.0, 2.0, 5.0));
        assert_eq!(bbox.min(), Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(bbox.max(), Vec3::new(3.0, 2.0, 5.0));
        assert_eq!(bbox.max_dimension(), 5.0);
    }

    #[test]
    fn test_aabb_ignores_non_finite() {
        let mut bbox = Aabb::empty();
        bbox.insert(Vec3::new(f32::NAN, 0.0, 0.0));
        bbox.insert(Vec3::new(f32::INFINITY, 0.0, 0.0));
        assert!(bbox.is_empty());
        bbox.insert(Vec3::new(1.0, 1.0, 1.0));
        assert!(!bbox.is_empty());
        assert_eq!(bbox.max_dimension(), 0.0);
    }
}
