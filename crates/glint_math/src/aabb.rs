use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box used as a conservative pre-filter before the
/// exact primitive intersection tests.
///
/// `min` is componentwise less than or equal to `max` for every non-empty box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Minimum extent along any axis; flat primitives get padded to this.
    const MIN_EXTENT: f32 = 0.0001;

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create the smallest AABB containing every point in `points`.
    ///
    /// Returns `Aabb::EMPTY` for an empty slice.
    pub fn from_slice(points: &[Vec3]) -> Self {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        let (min, max) = iter.fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Translate (move) the AABB by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns true if the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Test if a ray (travelling forward from its origin) touches this box.
    ///
    /// Slab method. A zero direction component cannot be inverted, so on that
    /// axis the ray is inside the slab iff its origin is. Touching a face counts
    /// as a hit: the test may report false positives, never false negatives.
    pub fn intersects(&self, ray: &Ray) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return false;
            }
        }

        true
    }

    /// Pad axes to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < Self::MIN_EXTENT {
                self.min[axis] -= Self::MIN_EXTENT * 0.5;
                self.max[axis] += Self::MIN_EXTENT * 0.5;
            }
        }
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };
}
