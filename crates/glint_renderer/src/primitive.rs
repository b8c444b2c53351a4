//! Scene primitives: a closed set of shapes, each with a box and a material.

use crate::intersection::IntersectionInfo;
use crate::material::{Color, Material};
use crate::mesh::Mesh;
use crate::plane::Plane;
use crate::renderer::RenderConfig;
use crate::scene::{Hit, Scene};
use crate::shading;
use crate::sphere::Sphere;
use crate::triangle::Triangle;
use glint_core::TriangleVertices;
use glint_math::{Aabb, Ray, Vec3};

/// Index of a primitive in its scene's primitive list.
///
/// Primitives never point back at the scene; code that needs the rest of the
/// scene (shadow rays) receives `&Scene` and the id of the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub usize);

/// The geometric kinds the tracer understands.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
    Plane(Plane),
    Mesh(Mesh),
}

impl Shape {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Triangle(t) => t.bounding_box(),
            Shape::Plane(p) => p.bounding_box(),
            Shape::Mesh(m) => m.bounding_box(),
        }
    }
}

/// A shape together with the one bounding box and one material it owns.
#[derive(Debug, Clone)]
pub struct Primitive {
    shape: Shape,
    material: Material,
    bbox: Aabb,
}

impl Primitive {
    /// Wrap a shape; the bounding box is computed here once.
    pub fn new(shape: Shape, material: Material) -> Self {
        let bbox = shape.bounding_box();
        Self { shape, material, bbox }
    }

    pub fn sphere(center: Vec3, radius: f32, material: Material) -> Self {
        Self::new(Shape::Sphere(Sphere::new(center, radius)), material)
    }

    pub fn triangle(triangle: Triangle, material: Material) -> Self {
        Self::new(Shape::Triangle(triangle), material)
    }

    pub fn plane(point: Vec3, normal: Vec3, material: Material) -> Self {
        Self::new(Shape::Plane(Plane::new(point, normal)), material)
    }

    pub fn mesh(triangles: Vec<TriangleVertices>, offset: Vec3, material: Material) -> Self {
        Self::new(Shape::Mesh(Mesh::new(triangles, offset)), material)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.shape, Shape::Mesh(_))
    }

    /// Exact intersection test.
    pub fn intersect(&self, ray: &Ray) -> Option<IntersectionInfo> {
        self.intersect_excluding(ray, None)
    }

    /// Exact intersection test; a mesh skips its triangle at `exclude`.
    pub fn intersect_excluding(&self, ray: &Ray, exclude: Option<usize>) -> Option<IntersectionInfo> {
        match &self.shape {
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Triangle(t) => t.intersect(ray),
            Shape::Plane(p) => p.intersect(ray),
            Shape::Mesh(m) => m.intersect(ray, exclude),
        }
    }

    /// Color of a hit on this primitive.
    pub fn shade(&self, scene: &Scene, hit: &Hit, ray_direction: Vec3, config: &RenderConfig) -> Color {
        shading::phong(&self.material, scene, hit, ray_direction, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample_primitives() -> Vec<Primitive> {
        let material = Material::default();
        let tri = Triangle::from_positions(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let mesh_tris: Vec<TriangleVertices> = vec![*tri.vertices(), *tri.translated(Vec3::X).vertices()];

        vec![
            Primitive::sphere(Vec3::new(0.5, -0.2, 0.1), 0.8, material),
            Primitive::triangle(tri, material),
            Primitive::mesh(mesh_tris, Vec3::new(0.0, 0.3, -0.4), material),
            Primitive::sphere(Vec3::new(-1.0, 1.0, 0.5), 0.05, material),
        ]
    }

    #[test]
    fn test_bounding_box_is_conservative() {
        let primitives = sample_primitives();
        let mut rng = StdRng::seed_from_u64(7);
        let mut exact_hits = 0;

        for _ in 0..20_000 {
            let origin = Vec3::new(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            // Aim somewhere near the primitives so plenty of rays hit
            let target = Vec3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.0..1.0),
            );
            let ray = Ray::new(origin, target - origin);

            for primitive in &primitives {
                if primitive.intersect(&ray).is_some() {
                    exact_hits += 1;
                    assert!(
                        primitive.bounding_box().intersects(&ray),
                        "box rejected a true hit: {:?} {:?}",
                        ray,
                        primitive.shape()
                    );
                }
            }
        }

        assert!(exact_hits > 1000);
    }

    #[test]
    fn test_axis_aligned_rays_are_conservative() {
        let primitives = sample_primitives();

        for primitive in &primitives {
            for dir in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z] {
                for step in -10..=10 {
                    let offset = step as f32 * 0.1;
                    let origin = -dir * 5.0 + Vec3::new(offset, offset * 0.5, -offset) * (Vec3::ONE - dir.abs());
                    let ray = Ray::new(origin, dir);
                    if primitive.intersect(&ray).is_some() {
                        assert!(primitive.bounding_box().intersects(&ray));
                    }
                }
            }
        }
    }

    #[test]
    fn test_mesh_primitive_records_sub_index() {
        let primitives = sample_primitives();
        let mesh = &primitives[2];
        assert!(mesh.is_mesh());

        let ray = Ray::new(Vec3::new(1.5, 0.0, 5.0), -Vec3::Z);
        let hit = mesh.intersect(&ray).unwrap();
        assert_eq!(hit.sub_index, Some(1));
        assert!(mesh.intersect_excluding(&ray, Some(1)).is_none());
    }
}
