//! Phong shading with optional soft shadows from the sampled area light.

use crate::material::{Color, Material};
use crate::renderer::RenderConfig;
use crate::scene::{Hit, Scene, LIGHT_SAMPLE_COUNT};
use glint_math::{Ray, Vec3};

/// Weight applied to every specular highlight.
pub const SPECULAR_WEIGHT: f32 = 0.5;

/// Distance shadow rays start above the surface they leave.
pub const SHADOW_BIAS: f32 = 1e-3;

/// The three Phong terms for one light position, as scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongTerms {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl PhongTerms {
    pub fn total(&self) -> f32 {
        self.ambient + self.diffuse + self.specular
    }
}

/// Visibility of one light sample from a hit point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSample {
    Occluded,
    Lit,
}

impl LightSample {
    /// Scalar contribution of this sample. Occluded samples keep their ambient term.
    pub fn contribution(self, terms: &PhongTerms) -> f32 {
        match self {
            LightSample::Occluded => terms.ambient,
            LightSample::Lit => terms.total(),
        }
    }
}

/// Phong terms for unit vectors `normal`, `to_light` and `to_viewer`.
pub fn phong_terms(material: &Material, normal: Vec3, to_light: Vec3, to_viewer: Vec3) -> PhongTerms {
    let n_dot_l = normal.dot(to_light);
    let reflected = 2.0 * n_dot_l * normal - to_light;
    let r_dot_v = reflected.dot(to_viewer).max(0.0);

    PhongTerms {
        ambient: material.ambient(),
        diffuse: n_dot_l.max(0.0),
        specular: SPECULAR_WEIGHT * material.specular_strength() * r_dot_v.powf(material.shininess as f32),
    }
}

/// Cast a shadow ray from `hit` toward `light`.
///
/// Blockers beyond the light do not count.
pub fn sample_light(scene: &Scene, hit: &Hit, light: Vec3) -> LightSample {
    let origin = hit.info.point + hit.info.normal * SHADOW_BIAS;
    let to_light = light - origin;
    let distance = to_light.length();
    if distance <= f32::EPSILON {
        return LightSample::Lit;
    }

    let shadow_ray = Ray::new(origin, to_light);
    if scene.occluded(&shadow_ray, distance, hit) {
        LightSample::Occluded
    } else {
        LightSample::Lit
    }
}

/// Color of `hit`, seen along `ray_direction`.
pub fn shade(scene: &Scene, hit: &Hit, ray_direction: Vec3, config: &RenderConfig) -> Color {
    match scene.get(hit.id) {
        Some(primitive) => primitive.shade(scene, hit, ray_direction, config),
        None => {
            log::warn!("Hit refers to missing primitive {:?}", hit.id);
            Color::ZERO
        }
    }
}

/// Shared Phong routine every primitive shades with.
pub(crate) fn phong(
    material: &Material,
    scene: &Scene,
    hit: &Hit,
    ray_direction: Vec3,
    config: &RenderConfig,
) -> Color {
    let point = hit.info.point;
    let normal = hit.info.normal;
    let to_viewer = -ray_direction;
    let terms_for = |light: Vec3| phong_terms(material, normal, (light - point).normalize_or_zero(), to_viewer);

    let intensity = if config.soft_shadows {
        let sum: f32 = scene
            .lights()
            .iter()
            .map(|&light| sample_light(scene, hit, light).contribution(&terms_for(light)))
            .sum();
        sum / LIGHT_SAMPLE_COUNT as f32
    } else {
        terms_for(scene.lights()[0]).total()
    };

    material.ambient_color * intensity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::IntersectionInfo;
    use crate::primitive::Primitive;

    fn floor_scene(light_height: f32) -> (Scene, Hit) {
        let mut scene = Scene::new(Vec3::new(0.0, light_height, 0.0), 1.0);
        let id = scene.add(Primitive::plane(
            Vec3::ZERO,
            Vec3::Y,
            Material::new(Color::splat(0.5), Color::ONE, 8),
        ));
        let hit = Hit {
            id,
            info: IntersectionInfo::new(Vec3::ZERO, Vec3::Y, 1.0),
        };
        (scene, hit)
    }

    #[test]
    fn test_phong_terms_head_on() {
        let material = Material::new(Color::splat(0.5), Color::ONE, 8);
        let terms = phong_terms(&material, Vec3::Y, Vec3::Y, Vec3::Y);

        assert!((terms.ambient - 0.15).abs() < 1e-6);
        assert!((terms.diffuse - 1.0).abs() < 1e-6);
        assert!((terms.specular - SPECULAR_WEIGHT).abs() < 1e-6);
        assert!((terms.total() - 1.65).abs() < 1e-6);
    }

    #[test]
    fn test_phong_terms_light_behind_surface() {
        let material = Material::matte(Color::ONE);
        let terms = phong_terms(&material, Vec3::Y, -Vec3::Y, Vec3::Y);

        assert_eq!(terms.diffuse, 0.0);
        assert_eq!(terms.specular, 0.0);
        assert!((terms.ambient - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_huge_shininess_keeps_specular_bounded() {
        let material = Material::new(Color::ONE, Color::ONE, u32::MAX);
        let to_light = Vec3::new(0.3, 1.0, 0.0).normalize();

        let off_axis = phong_terms(&material, Vec3::Y, to_light, Vec3::Y);
        assert!(off_axis.specular.is_finite());
        assert_eq!(off_axis.specular, 0.0);

        let grazing = phong_terms(&material, Vec3::Y, Vec3::X, Vec3::Y);
        assert_eq!(grazing.specular, 0.0);

        let head_on = phong_terms(&material, Vec3::Y, Vec3::Y, Vec3::Y);
        assert!((head_on.specular - SPECULAR_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_hard_mode_uses_first_sample_unconditionally() {
        let (mut scene, hit) = floor_scene(5.0);
        // A blocker directly above is ignored without soft shadows
        scene.add(Primitive::sphere(Vec3::new(0.0, 2.0, 0.0), 1.5, Material::default()));
        let config = RenderConfig::default();
        assert!(!config.soft_shadows);

        let material = *scene.primitives()[0].material();
        let light = scene.lights()[0];
        let expected = material.ambient_color
            * phong_terms(&material, Vec3::Y, light.normalize(), Vec3::Y).total();

        let color = shade(&scene, &hit, -Vec3::Y, &config);
        assert!((color - expected).length() < 1e-5);
    }

    #[test]
    fn test_fully_occluded_soft_shadow_is_ambient_only() {
        let (mut scene, hit) = floor_scene(10.0);
        scene.add(Primitive::sphere(Vec3::new(0.0, 5.0, 0.0), 2.0, Material::default()));
        let config = RenderConfig {
            soft_shadows: true,
            ..RenderConfig::default()
        };

        for &light in scene.lights() {
            assert_eq!(sample_light(&scene, &hit, light), LightSample::Occluded);
        }

        let color = shade(&scene, &hit, -Vec3::Y, &config);
        assert!((color - Color::splat(0.5 * 0.15)).length() < 1e-5);
    }

    #[test]
    fn test_unblocked_soft_shadow_averages_samples() {
        let (scene, hit) = floor_scene(4.0);
        let config = RenderConfig {
            soft_shadows: true,
            ..RenderConfig::default()
        };
        let material = *scene.primitives()[0].material();

        let mean: f32 = scene
            .lights()
            .iter()
            .map(|light| phong_terms(&material, Vec3::Y, light.normalize(), Vec3::Y).total())
            .sum::<f32>()
            / LIGHT_SAMPLE_COUNT as f32;

        let color = shade(&scene, &hit, -Vec3::Y, &config);
        assert!((color - material.ambient_color * mean).length() < 1e-5);
    }

    #[test]
    fn test_occluded_sample_contributes_ambient() {
        let terms = PhongTerms {
            ambient: 0.1,
            diffuse: 0.6,
            specular: 0.2,
        };

        assert_eq!(LightSample::Occluded.contribution(&terms), 0.1);
        assert!((LightSample::Lit.contribution(&terms) - 0.9).abs() < 1e-6);
    }
}
