//! Phong surface description.

use glint_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// The color collection a primitive is shaded with.
///
/// Immutable once built. `Material::new` follows the convention that the
/// ambient color equals the diffuse color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color; the final pixel color is this times the Phong scalar
    pub ambient_color: Color,
    /// Fixed ambient light intensity (per channel)
    pub ambient_intensity: Color,
    pub diffuse_color: Color,
    pub specular_color: Color,
    /// Specular exponent
    pub shininess: u32,
}

impl Material {
    /// Ambient intensity used by every material built with `Material::new`.
    pub const AMBIENT_INTENSITY: Color = Vec3::splat(0.1);

    /// Create a material whose ambient and diffuse colors are both `color`.
    pub fn new(color: Color, specular_color: Color, shininess: u32) -> Self {
        Self {
            ambient_color: color,
            ambient_intensity: Self::AMBIENT_INTENSITY,
            diffuse_color: color,
            specular_color,
            shininess,
        }
    }

    /// A material with no highlight.
    pub fn matte(color: Color) -> Self {
        Self::new(color, Color::ZERO, 0)
    }

    /// Scalar ambient term: ambient color weighted by the ambient intensity.
    pub fn ambient(&self) -> f32 {
        self.ambient_color.dot(self.ambient_intensity)
    }

    /// Scalar specular strength (brightest specular channel).
    pub fn specular_strength(&self) -> f32 {
        self.specular_color.max_element()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Color::splat(0.8), Color::ONE, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_ambient_equal_to_diffuse() {
        let m = Material::new(Color::new(0.2, 0.4, 0.6), Color::ONE, 8);

        assert_eq!(m.ambient_color, m.diffuse_color);
        assert_eq!(m.ambient_intensity, Material::AMBIENT_INTENSITY);
    }

    #[test]
    fn test_ambient_term() {
        let m = Material::matte(Color::new(1.0, 0.5, 0.0));
        assert!((m.ambient() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_specular_strength() {
        let m = Material::new(Color::ONE, Color::new(0.1, 0.7, 0.3), 4);
        assert!((m.specular_strength() - 0.7).abs() < 1e-6);
        assert_eq!(Material::matte(Color::ONE).specular_strength(), 0.0);
    }
}
