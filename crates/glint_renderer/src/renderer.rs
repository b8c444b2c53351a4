//! Core Whitted-style tracer.
//!
//! Implements:
//! - Nearest-hit visibility with Phong shading
//! - Mirror reflections weighted down by generation
//! - A lock-free RGBA frame buffer shared by all render threads

use crate::chunk::DEFAULT_CHUNK_LENGTH;
use crate::error::RenderError;
use crate::material::Color;
use crate::scene::Scene;
use crate::shading::shade;
use crate::Camera;
use glint_math::{Ray, Vec3};
use std::sync::atomic::{AtomicU32, Ordering};

/// Distance reflected rays start above the surface they leave.
pub const REFLECTION_BIAS: f32 = 1e-3;

/// Render configuration.
///
/// Passed by value into every frame, so changes only take effect between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Sample all nine light positions with shadow rays
    pub soft_shadows: bool,
    /// Extra mirror bounces after the primary hit
    pub reflection_bounces: u32,
    /// Log per-frame statistics
    pub logging: bool,
    /// Color of pixels whose primary ray hits nothing
    pub background: Color,
    /// Pixels per chunk row segment
    pub chunk_length: u32,
}

impl RenderConfig {
    /// Ray generations traced per pixel.
    pub fn used_rays(&self) -> u32 {
        1 + self.reflection_bounces
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            soft_shadows: false,
            reflection_bounces: 0,
            logging: false,
            background: Color::ZERO,
            chunk_length: DEFAULT_CHUNK_LENGTH,
        }
    }
}

/// Outcome of tracing one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traced {
    /// Final color, clamped to [0, 1]
    pub color: Color,
    /// Number of nearest-hit queries that found a primitive
    pub hits: u32,
}

/// Trace `ray` through up to `config.used_rays()` generations.
///
/// Generation `g` (from 1) adds its shaded color divided by `g`. Tracing
/// stops at the first generation that hits nothing; if that is the primary
/// ray the result is the background color.
pub fn trace(scene: &Scene, ray: &Ray, config: &RenderConfig) -> Traced {
    let mut color = Color::ZERO;
    let mut hits = 0;
    let mut ray = *ray;

    for generation in 1..=config.used_rays() {
        let Some(hit) = scene.nearest_hit(&ray) else {
            if generation == 1 {
                color = config.background;
            }
            break;
        };
        hits += 1;

        color += shade(scene, &hit, ray.direction, config) / generation as f32;

        let normal = hit.info.normal;
        let reflected = ray.reflect(normal);
        ray = Ray::offset(hit.info.point, normal, REFLECTION_BIAS, reflected);
    }

    Traced {
        color: color.clamp(Vec3::ZERO, Vec3::ONE),
        hits,
    }
}

/// Trace the primary ray of pixel (x, y).
pub fn render_pixel(scene: &Scene, camera: &Camera, x: u32, y: u32, config: &RenderConfig) -> Traced {
    trace(scene, &camera.get_ray(x, y), config)
}

/// Convert a color to 8-bit RGBA. Channels are clamped, no gamma is applied.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE);
    [
        (255.0 * c.x) as u8,
        (255.0 * c.y) as u8,
        (255.0 * c.z) as u8,
        255,
    ]
}

/// Packed RGBA8 frame shared by every render thread.
///
/// Each pixel is an `AtomicU32`, so threads writing disjoint chunks need
/// neither locks nor `unsafe`. Cross-thread visibility of a finished frame
/// comes from the scheduler's completion counter.
#[derive(Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl FrameBuffer {
    /// Create an opaque black frame.
    pub fn new(width: u32, height: u32) -> Self {
        let black = u32::from_le_bytes([0, 0, 0, 255]);
        Self {
            width,
            height,
            pixels: (0..width as usize * height as usize).map(|_| AtomicU32::new(black)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, RenderError> {
        if x >= self.width || y >= self.height {
            return Err(RenderError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Store the color of pixel (x, y).
    pub fn set(&self, x: u32, y: u32, color: Color) -> Result<(), RenderError> {
        let index = self.index(x, y)?;
        self.pixels[index].store(u32::from_le_bytes(color_to_rgba(color)), Ordering::Relaxed);
        Ok(())
    }

    /// RGBA bytes of pixel (x, y), or `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let index = self.index(x, y).ok()?;
        Some(self.pixels[index].load(Ordering::Relaxed).to_le_bytes())
    }

    /// Copy out the frame as tightly packed RGBA bytes, row 0 first.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.load(Ordering::Relaxed).to_le_bytes());
        }
        bytes
    }
}

/// Store a pixel, logging instead of failing the frame on a bad coordinate.
pub(crate) fn write_pixel(buffer: &FrameBuffer, x: u32, y: u32, color: Color) {
    if let Err(e) = buffer.set(x, y, color) {
        log::warn!("Dropped pixel write: {}", e);
    }
}

/// Render the entire scene into a new frame buffer.
///
/// This is a simple single-threaded renderer, used as the reference the
/// chunk scheduler is checked against.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> FrameBuffer {
    let buffer = FrameBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let traced = render_pixel(scene, camera, x, y, config);
            write_pixel(&buffer, x, y, traced.color);
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::primitive::Primitive;

    fn camera(look_from: Vec3, look_at: Vec3, size: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(size, size)
            .with_position(look_from, look_at, Vec3::Y)
            .with_fov(60.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::new(0.0, 0.5, 1.0)), [0, 127, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(-1.0, 2.0, 0.25)), [0, 255, 63, 255]);
    }

    #[test]
    fn test_frame_buffer_bounds() {
        let buffer = FrameBuffer::new(4, 3);
        assert_eq!(buffer.len(), 12);

        buffer.set(3, 2, Color::ONE).unwrap();
        assert_eq!(buffer.get(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(buffer.get(0, 0), Some([0, 0, 0, 255]));

        assert!(matches!(
            buffer.set(4, 0, Color::ONE),
            Err(RenderError::PixelOutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(buffer.get(0, 3).is_none());
        assert_eq!(buffer.to_rgba().len(), 48);
    }

    #[test]
    fn test_empty_scene_is_background() {
        let scene = Scene::new(Vec3::new(0.0, 5.0, 0.0), 1.0);
        let config = RenderConfig {
            background: Color::new(0.2, 0.4, 0.6),
            reflection_bounces: 1,
            ..RenderConfig::default()
        };
        let camera = camera(Vec3::ZERO, -Vec3::Z, 8);

        let buffer = render(&scene, &camera, &config);
        let expected = color_to_rgba(config.background);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(buffer.get(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn test_single_plane_matches_hand_computed_phong() {
        let mut scene = Scene::new(Vec3::new(0.0, 5.0, 0.0), 1.0);
        scene.add(Primitive::plane(
            Vec3::ZERO,
            Vec3::Y,
            Material::new(Color::splat(0.5), Color::ONE, 8),
        ));
        let camera = camera(Vec3::new(0.0, 2.0, 2.0), Vec3::new(0.0, 0.0, -2.0), 8);
        let config = RenderConfig::default();
        let buffer = render(&scene, &camera, &config);

        let ray = camera.get_ray(4, 6);
        let t = -ray.origin.y / ray.direction.y;
        let point = ray.at(t);

        let n = Vec3::Y;
        let l = (Vec3::new(-1.0, 5.0, -1.0) - point).normalize();
        let v = -ray.direction;
        let r = 2.0 * n.dot(l) * n - l;
        let ambient = 0.5 * 0.1 * 3.0;
        let diffuse = n.dot(l).max(0.0);
        let specular = 0.5 * 1.0 * r.dot(v).max(0.0).powi(8);
        let expected = 0.5 * (ambient + diffuse + specular);
        let expected = (255.0 * expected.clamp(0.0, 1.0)) as i32;

        let pixel = buffer.get(4, 6).unwrap();
        for channel in &pixel[..3] {
            assert!((*channel as i32 - expected).abs() <= 1, "{:?} vs {}", pixel, expected);
        }
    }

    #[test]
    fn test_reflection_toggle_changes_pixels() {
        let mut scene = Scene::new(Vec3::ZERO, 1.0);
        let mirror = Material::new(Color::splat(0.3), Color::ONE, 16);
        scene.add(Primitive::plane(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, mirror));
        scene.add(Primitive::plane(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, mirror));
        let camera = camera(Vec3::ZERO, -Vec3::Z, 8);

        let direct = RenderConfig::default();
        let reflected = RenderConfig {
            reflection_bounces: 1,
            ..RenderConfig::default()
        };

        let ray = camera.get_ray(4, 4);
        assert_eq!(trace(&scene, &ray, &direct).hits, 1);
        assert_eq!(trace(&scene, &ray, &reflected).hits, 2);

        let before = render(&scene, &camera, &direct).to_rgba();
        let after = render(&scene, &camera, &reflected).to_rgba();
        assert_ne!(before, after);
    }

    #[test]
    fn test_trace_stops_after_a_miss() {
        let mut scene = Scene::new(Vec3::new(0.0, 5.0, 0.0), 1.0);
        scene.add(Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default()));
        let config = RenderConfig {
            reflection_bounces: 3,
            background: Color::ONE,
            ..RenderConfig::default()
        };

        // The bounce leaves the sphere toward empty space
        let traced = trace(&scene, &Ray::new(Vec3::ZERO, -Vec3::Z), &config);
        assert_eq!(traced.hits, 1);
        assert!(traced.color.x < 1.0);

        let missed = trace(&scene, &Ray::new(Vec3::ZERO, Vec3::Z), &config);
        assert_eq!(missed.hits, 0);
        assert_eq!(missed.color, Color::ONE);
    }
}
