//! Sphere primitive for ray tracing.

use crate::intersection::{IntersectionInfo, EPSILON};
use glint_math::{Aabb, Ray, Vec3};

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    /// Geometric ray-sphere test.
    ///
    /// The center is projected onto the ray; rays whose closest approach lies
    /// behind the origin, or passes farther from the center than the radius,
    /// miss. Of the two roots the smaller positive one wins.
    pub fn intersect(&self, ray: &Ray) -> Option<IntersectionInfo> {
        let to_center = self.center - ray.origin;
        let tca = to_center.dot(ray.direction);
        if tca < 0.0 {
            return None;
        }

        let radius2 = self.radius * self.radius;
        let d2 = to_center.length_squared() - tca * tca;
        if d2 > radius2 {
            return None;
        }

        let thc = (radius2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;
        let t = if t0 > EPSILON {
            t0
        } else if t1 > EPSILON {
            t1
        } else {
            return None;
        };

        let point = ray.at(t);
        let normal = (point - self.center).normalize_or_zero();
        Some(IntersectionInfo::new(point, normal, t))
    }
}
