//! Ray/primitive intersection record.

use glint_math::Vec3;

/// Tolerance for degenerate geometry (parallel rays, vanishing determinants)
/// and for rejecting hits too close to the ray origin.
pub const EPSILON: f32 = 1e-6;

/// Record of a ray-primitive intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionInfo {
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at the intersection. Spheres and triangles report unit
    /// normals, planes report the normal they were built with.
    pub normal: Vec3,
    /// Ray parameter of the hit, always > 0
    pub t: f32,
    /// Index of the struck triangle for mesh hits, `None` otherwise
    pub sub_index: Option<usize>,
}

impl IntersectionInfo {
    pub fn new(point: Vec3, normal: Vec3, t: f32) -> Self {
        Self {
            point,
            normal,
            t,
            sub_index: None,
        }
    }
}
