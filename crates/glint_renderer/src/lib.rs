//! Glint Renderer - interactive Whitted-style CPU ray tracing.
//!
//! Rays from a pinhole camera are intersected with a small scene of spheres,
//! triangles, planes and triangle meshes, shaded with Phong illumination
//! (optionally soft-shadowed by a 3x3 area light) and followed through
//! mirror reflections. Frames are split into row chunks that a persistent
//! worker pool and the calling thread claim through a shared atomic cursor.

mod camera;
mod chunk;
mod driver;
mod error;
mod intersection;
mod material;
mod mesh;
mod plane;
mod primitive;
mod renderer;
mod scene;
mod scheduler;
mod shading;
mod sphere;
mod triangle;

pub use camera::Camera;
pub use chunk::{generate_chunks, render_chunk, Chunk, ChunkResult, DEFAULT_CHUNK_LENGTH};
pub use driver::{Display, FrameDriver, FrameStats, InputState, DEFAULT_LIGHT_SPEED};
pub use error::RenderError;
pub use intersection::{IntersectionInfo, EPSILON};
pub use material::{Color, Material};
pub use mesh::Mesh;
pub use plane::Plane;
pub use primitive::{Primitive, PrimitiveId, Shape};
pub use renderer::{
    color_to_rgba, render, render_pixel, trace, FrameBuffer, RenderConfig, Traced, REFLECTION_BIAS,
};
pub use scene::{Hit, Scene, LIGHT_SAMPLE_COUNT};
pub use scheduler::{ChunkScheduler, FrameJob, FrameState};
pub use shading::{
    phong_terms, sample_light, shade, LightSample, PhongTerms, SHADOW_BIAS, SPECULAR_WEIGHT,
};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Ray, Vec3};
