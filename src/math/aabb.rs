//! Axis-aligned bounding box

use crate::core::types::Vec3;
use super::Sphere;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box that contains nothing; expanding it by a point yields that point.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing every `[x, y, z]` row of a flat position buffer.
    ///
    /// Returns [`Aabb::EMPTY`] for an empty buffer.
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        points.iter().fold(Self::EMPTY, |mut aabb, p| {
            aabb.expand(Vec3::from_array(*p));
            aabb
        })
    }

    /// True when the box encloses no point at all
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Point of the box nearest to `p` (`p` itself when inside)
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.max(self.min).min(self.max)
    }

    /// Squared distance from `p` to the box, zero when inside
    pub fn distance_squared_to_point(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    /// Check if the box and sphere share at least one point.
    ///
    /// Touching counts as intersecting. An empty box intersects nothing.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        if self.is_empty() {
            return false;
        }
        self.distance_squared_to_point(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Expand AABB to include point
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_not_empty() {
        assert!(!Aabb::new(Vec3::ZERO, Vec3::ONE).is_empty());
        assert!(Aabb::new(Vec3::ONE, Vec3::ZERO).is_empty());
    }

    #[test]
    fn test_from_points() {
        let points = [[1.0, 5.0, -2.0], [-3.0, 2.0, 4.0], [0.0, 7.0, 0.0]];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.min, Vec3::new(-3.0, 2.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 7.0, 4.0));
    }

    #[test]
    fn test_from_points_empty() {
        let aabb = Aabb::from_points(&[]);
        assert!(aabb.is_empty());
        assert_eq!(aabb, Aabb::EMPTY);
    }

    #[test]
    fn test_single_point_is_not_empty() {
        let aabb = Aabb::from_points(&[[2.0, 2.0, 2.0]]);
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn test_closest_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.closest_point(Vec3::new(3.0, 0.5, -1.0)), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(aabb.closest_point(Vec3::splat(0.25)), Vec3::splat(0.25));
    }

    #[test]
    fn test_intersects_sphere() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert!(aabb.intersects_sphere(&Sphere::new(Vec3::splat(5.0), 1.0)));
        assert!(aabb.intersects_sphere(&Sphere::new(Vec3::new(15.0, 5.0, 5.0), 5.0)));
        assert!(!aabb.intersects_sphere(&Sphere::new(Vec3::new(15.0, 5.0, 5.0), 4.9)));
        // Corner case: nearest point is the (10, 10, 10) corner
        assert!(!aabb.intersects_sphere(&Sphere::new(Vec3::splat(14.0), 6.0)));
        assert!(aabb.intersects_sphere(&Sphere::new(Vec3::splat(14.0), 7.0)));
    }

    #[test]
    fn test_empty_never_intersects() {
        let sphere = Sphere::new(Vec3::ZERO, f32::MAX);
        assert!(!Aabb::EMPTY.intersects_sphere(&sphere));
    }
}
