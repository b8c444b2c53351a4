//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm with back-face culling. Shading normals
//! are interpolated from the vertex normals, so meshes shade smoothly.

use crate::intersection::{IntersectionInfo, EPSILON};
use glint_core::{TriangleVertices, Vertex};
use glint_math::{Aabb, Ray, Vec3};

/// A triangle with per-vertex normals. Front faces wind counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: TriangleVertices,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Create a flat-shaded triangle; every vertex gets the face normal.
    pub fn from_positions(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        Self::new(
            Vertex::new(p0, normal),
            Vertex::new(p1, normal),
            Vertex::new(p2, normal),
        )
    }

    pub fn vertices(&self) -> &TriangleVertices {
        &self.vertices
    }

    /// The same triangle moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        let mut vertices = self.vertices;
        for vertex in &mut vertices {
            vertex.position += offset;
        }
        Self { vertices }
    }

    pub fn bounding_box(&self) -> Aabb {
        let [a, b, c] = self.vertices;
        Aabb::from_points(
            a.position.min(b.position).min(c.position),
            a.position.max(b.position).max(c.position),
        )
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Rays arriving at the back face are rejected, as are rays (nearly)
    /// parallel to the triangle plane.
    pub fn intersect(&self, ray: &Ray) -> Option<IntersectionInfo> {
        let [a, b, c] = self.vertices;
        let edge1 = b.position - a.position;
        let edge2 = c.position - a.position;

        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);

        // Back face or parallel
        if det < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin - a.position;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(qvec) * inv_det;
        if t <= EPSILON {
            return None;
        }

        let w = 1.0 - u - v;
        let interpolated = a.normal * w + b.normal * u + c.normal * v;
        let normal = match interpolated.try_normalize() {
            Some(n) => n,
            None => edge1.cross(edge2).normalize_or_zero(),
        };

        Some(IntersectionInfo::new(ray.at(t), normal, t))
    }
}

impl From<TriangleVertices> for Triangle {
    fn from(vertices: TriangleVertices) -> Self {
        Self { vertices }
    }
}
