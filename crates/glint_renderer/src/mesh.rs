//! Triangle mesh primitive.

use crate::intersection::IntersectionInfo;
use crate::triangle::Triangle;
use glint_core::TriangleVertices;
use glint_math::{Aabb, Ray, Vec3};

/// An ordered list of triangles placed at an offset.
///
/// Triangles are stored in world space together with their own bounding
/// boxes, which pre-filter every exact test.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    boxes: Vec<Aabb>,
    bbox: Aabb,
}

impl Mesh {
    /// Build a mesh from imported triangles, moved by `offset`.
    pub fn new(triangles: Vec<TriangleVertices>, offset: Vec3) -> Self {
        Self::from_triangles(triangles.into_iter().map(Triangle::from).collect(), offset)
    }

    pub fn from_triangles(triangles: Vec<Triangle>, offset: Vec3) -> Self {
        let local_bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, tri| Aabb::surrounding(&acc, &tri.bounding_box()));

        let triangles: Vec<Triangle> = triangles.iter().map(|tri| tri.translated(offset)).collect();
        let boxes = triangles.iter().map(Triangle::bounding_box).collect();

        Self {
            triangles,
            boxes,
            bbox: local_bbox.translate(offset),
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Closest hit over all triangles, skipping the triangle at `exclude`.
    ///
    /// The returned info records the struck triangle in `sub_index`.
    pub fn intersect(&self, ray: &Ray, exclude: Option<usize>) -> Option<IntersectionInfo> {
        let mut closest: Option<IntersectionInfo> = None;

        for (index, (triangle, bbox)) in self.triangles.iter().zip(&self.boxes).enumerate() {
            if exclude == Some(index) || !bbox.intersects(ray) {
                continue;
            }
            if let Some(mut info) = triangle.intersect(ray) {
                if closest.map_or(true, |best| info.t < best.t) {
                    info.sub_index = Some(index);
                    closest = Some(info);
                }
            }
        }

        closest
    }
}
