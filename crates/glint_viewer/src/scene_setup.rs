//! The demo scene shown by the viewer.

use glint_core::{TriangleVertices, Vertex};
use glint_math::Vec3;
use glint_renderer::{Camera, Color, Material, Primitive, Scene, Triangle};

/// Where the toggleable mesh is placed.
pub const MESH_OFFSET: Vec3 = Vec3::new(0.0, -0.4, -3.0);

const LIGHT_CENTER: Vec3 = Vec3::new(0.0, 6.0, 1.0);
const LIGHT_SPACING: f32 = 0.6;

/// Floor, back wall, three spheres and a triangle, with `mesh` held aside as
/// the extra primitive. Without a mesh a small pyramid is used.
pub fn demo_scene(mesh: Option<Vec<TriangleVertices>>) -> Scene {
    let mut scene = Scene::new(LIGHT_CENTER, LIGHT_SPACING);

    scene.add(Primitive::plane(
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::Y,
        Material::new(Color::new(0.75, 0.75, 0.7), Color::splat(0.2), 4),
    ));
    scene.add(Primitive::plane(
        Vec3::new(0.0, 0.0, -12.0),
        Vec3::Z,
        Material::matte(Color::new(0.35, 0.45, 0.6)),
    ));

    scene.add(Primitive::sphere(
        Vec3::new(-2.2, 0.0, -6.0),
        1.0,
        Material::new(Color::new(0.9, 0.2, 0.2), Color::ONE, 32),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(0.0, 0.0, -7.0),
        1.0,
        Material::new(Color::new(0.2, 0.85, 0.3), Color::ONE, 64),
    ));
    scene.add(Primitive::sphere(
        Vec3::new(2.2, 0.0, -6.0),
        1.0,
        Material::new(Color::new(0.2, 0.35, 0.9), Color::splat(0.6), 16),
    ));

    scene.add(Primitive::triangle(
        Triangle::from_positions(
            Vec3::new(-4.5, -1.0, -9.0),
            Vec3::new(-1.5, -1.0, -9.0),
            Vec3::new(-3.0, 2.0, -9.0),
        ),
        Material::new(Color::new(0.95, 0.8, 0.3), Color::ONE, 8),
    ));

    let triangles = mesh.unwrap_or_else(pyramid);
    scene.set_extra(Primitive::mesh(
        triangles,
        MESH_OFFSET,
        Material::new(Color::new(0.8, 0.5, 0.9), Color::ONE, 24),
    ));

    scene
}

/// Camera framing the demo scene.
pub fn demo_camera(width: u32, height: u32) -> Camera {
    Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, 1.0, 3.0), Vec3::new(0.0, 0.0, -6.0), Vec3::Y)
        .with_fov(60.0)
}

/// Four-sided pyramid with a square base, counter-clockwise seen from outside.
fn pyramid() -> Vec<TriangleVertices> {
    let apex = Vec3::new(0.0, 1.2, 0.0);
    let base = [
        Vec3::new(-0.6, 0.0, 0.6),
        Vec3::new(0.6, 0.0, 0.6),
        Vec3::new(0.6, 0.0, -0.6),
        Vec3::new(-0.6, 0.0, -0.6),
    ];

    let mut triangles = Vec::with_capacity(6);
    for i in 0..4 {
        let (a, b) = (base[i], base[(i + 1) % 4]);
        triangles.push(flat(a, b, apex));
    }
    triangles.push(flat(base[0], base[2], base[1]));
    triangles.push(flat(base[0], base[3], base[2]));
    triangles
}

fn flat(a: Vec3, b: Vec3, c: Vec3) -> TriangleVertices {
    let normal = (b - a).cross(c - a).normalize();
    [Vertex::new(a, normal), Vertex::new(b, normal), Vertex::new(c, normal)]
}
