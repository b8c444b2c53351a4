use crate::Vec3;

/// A ray in 3D space with an origin and a unit-length direction.
///
/// Every intersection routine in Glint assumes `direction` is normalized,
/// so the constructor normalizes whatever it is given.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray whose origin is pushed `bias` units along `normal`.
    ///
    /// Used for shadow and reflection rays so they do not immediately
    /// re-hit the surface they leave.
    pub fn offset(point: Vec3, normal: Vec3, bias: f32, direction: Vec3) -> Self {
        Self::new(point + normal * bias, direction)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Mirror the direction about the unit `normal`.
    pub fn reflect(&self, normal: Vec3) -> Vec3 {
        self.direction - 2.0 * self.direction.dot(normal) * normal
    }
}
