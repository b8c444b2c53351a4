//! Scene container: primitives, area-light samples and the toggleable extra.

use crate::intersection::IntersectionInfo;
use crate::primitive::{Primitive, PrimitiveId};
use glint_math::{Ray, Vec3};

/// Number of point samples the area light is made of (a 3x3 grid).
pub const LIGHT_SAMPLE_COUNT: usize = 9;

/// Nearest intersection of a ray with the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: PrimitiveId,
    pub info: IntersectionInfo,
}

/// All geometry and lights of a frame.
///
/// The scene exclusively owns its primitives. It may additionally hold one
/// "extra" primitive that can be moved into the active list and back out
/// again between frames; it is never duplicated or destroyed by doing so.
#[derive(Debug, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: [Vec3; LIGHT_SAMPLE_COUNT],
    light_spacing: f32,
    /// The extra primitive while it is held aside
    extra: Option<Primitive>,
    /// Position of the extra primitive in `primitives` while it is active;
    /// always the last one
    extra_slot: Option<usize>,
}

impl Scene {
    /// Create an empty scene whose area light is centered at `light_center`,
    /// with samples `light_spacing` apart in the XZ plane.
    pub fn new(light_center: Vec3, light_spacing: f32) -> Self {
        Self {
            primitives: Vec::new(),
            lights: light_grid(light_center, light_spacing),
            light_spacing,
            extra: None,
            extra_slot: None,
        }
    }

    /// Add a primitive to the active list.
    ///
    /// While the extra primitive is active it stays last in the list, so the
    /// new primitive goes in front of it and ids handed out here stay valid
    /// across later `remove_extra` calls.
    pub fn add(&mut self, primitive: Primitive) -> PrimitiveId {
        match self.extra_slot {
            Some(slot) => {
                self.primitives.insert(slot, primitive);
                self.extra_slot = Some(slot + 1);
                PrimitiveId(slot)
            }
            None => {
                self.primitives.push(primitive);
                PrimitiveId(self.primitives.len() - 1)
            }
        }
    }

    /// Hand the scene its extra primitive, initially held aside.
    ///
    /// Returns the previous extra, if any, after taking it out of the active list.
    pub fn set_extra(&mut self, primitive: Primitive) -> Option<Primitive> {
        self.remove_extra();
        self.extra.replace(primitive)
    }

    /// Move the extra primitive into the active list. Returns false if there
    /// is nothing held aside.
    pub fn add_extra(&mut self) -> bool {
        match self.extra.take() {
            Some(primitive) => {
                self.primitives.push(primitive);
                self.extra_slot = Some(self.primitives.len() - 1);
                true
            }
            None => false,
        }
    }

    /// Move the extra primitive out of the active list. Returns false if it
    /// was not active.
    pub fn remove_extra(&mut self) -> bool {
        match self.extra_slot.take() {
            Some(slot) => {
                self.extra = Some(self.primitives.remove(slot));
                true
            }
            None => false,
        }
    }

    pub fn is_extra_active(&self) -> bool {
        self.extra_slot.is_some()
    }

    pub fn has_extra(&self) -> bool {
        self.extra.is_some() || self.extra_slot.is_some()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn lights(&self) -> &[Vec3; LIGHT_SAMPLE_COUNT] {
        &self.lights
    }

    /// Center of the area light (the middle grid sample).
    pub fn light_center(&self) -> Vec3 {
        self.lights[LIGHT_SAMPLE_COUNT / 2]
    }

    /// Move every light sample by `delta`.
    pub fn move_lights(&mut self, delta: Vec3) {
        self.lights = light_grid(self.light_center() + delta, self.light_spacing);
    }

    /// Closest hit of `ray` with any primitive.
    ///
    /// Primitives are tested in list order after their box accepts the ray;
    /// a later hit only wins with a strictly smaller `t`.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut closest: Option<Hit> = None;

        for (index, primitive) in self.primitives.iter().enumerate() {
            if !primitive.bounding_box().intersects(ray) {
                continue;
            }
            if let Some(info) = primitive.intersect(ray) {
                if closest.map_or(true, |best| info.t < best.info.t) {
                    closest = Some(Hit {
                        id: PrimitiveId(index),
                        info,
                    });
                }
            }
        }

        closest
    }

    /// True if something blocks `ray` before `max_t`.
    ///
    /// The primitive that was hit (`from`) is skipped, except that a mesh
    /// still tests its other triangles so it can shadow itself.
    pub fn occluded(&self, ray: &Ray, max_t: f32, from: &Hit) -> bool {
        self.primitives.iter().enumerate().any(|(index, primitive)| {
            let exclude = if index == from.id.0 {
                if !primitive.is_mesh() {
                    return false;
                }
                from.info.sub_index
            } else {
                None
            };

            primitive.bounding_box().intersects(ray)
                && primitive
                    .intersect_excluding(ray, exclude)
                    .is_some_and(|info| info.t < max_t)
        })
    }
}

/// Light samples on a 3x3 grid in the XZ plane, row by row; sample 0 is a corner.
fn light_grid(center: Vec3, spacing: f32) -> [Vec3; LIGHT_SAMPLE_COUNT] {
    let mut lights = [Vec3::ZERO; LIGHT_SAMPLE_COUNT];
    for (i, light) in lights.iter_mut().enumerate() {
        let col = (i % 3) as f32 - 1.0;
        let row = (i / 3) as f32 - 1.0;
        *light = center + Vec3::new(col * spacing, 0.0, row * spacing);
    }
    lights
}
