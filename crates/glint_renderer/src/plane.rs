//! Infinite plane primitive.

use crate::intersection::{IntersectionInfo, EPSILON};
use glint_math::{Aabb, Ray, Vec3};

/// An infinite plane through `point` with a fixed unit `normal`.
///
/// Only the side the normal points to is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Planes are unbounded, so their box accepts every ray.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    pub fn intersect(&self, ray: &Ray) -> Option<IntersectionInfo> {
        let denom = self.normal.dot(ray.direction);
        // Parallel, grazing, or approaching from behind
        if denom > -EPSILON {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t <= EPSILON {
            return None;
        }

        Some(IntersectionInfo::new(ray.at(t), self.normal, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_hit() {
        let floor = Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 1.0));

        let hit = floor.intersect(&ray).unwrap();
        assert!((hit.point.y + 1.0).abs() < 1e-5);
        assert!((hit.point.z - 2.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_rejects_parallel_and_back_side() {
        let floor = Plane::new(Vec3::ZERO, Vec3::Y);

        assert!(floor.intersect(&Ray::new(Vec3::Y, Vec3::X)).is_none());
        assert!(floor.intersect(&Ray::new(-Vec3::Y, -Vec3::Y)).is_none());
        assert!(floor.intersect(&Ray::new(-Vec3::Y, Vec3::Y)).is_none());
    }

    #[test]
    fn test_plane_behind_origin() {
        let wall = Plane::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        // The plane faces -Z and lies ahead
        assert!(wall.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).is_some());
        // Looking away from it never reaches it
        assert!(wall.intersect(&Ray::new(Vec3::ZERO, -Vec3::Z)).is_none());
    }
}
