//! Row-segment chunks, the unit of work claimed by render threads.
//!
//! The image is cut into horizontal runs of at most `chunk_length` pixels.
//! Chunks never overlap and together cover every pixel exactly once, so
//! each pixel has a single writer per frame.

use crate::renderer::{render_pixel, write_pixel, FrameBuffer, RenderConfig};
use crate::scene::Scene;
use crate::Camera;

/// Default chunk length in pixels.
pub const DEFAULT_CHUNK_LENGTH: u32 = 64;

/// A run of pixels `[x_start, x_end)` on row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub x_start: u32,
    /// Exclusive end column
    pub x_end: u32,
    pub y: u32,
}

impl Chunk {
    pub fn new(x_start: u32, x_end: u32, y: u32) -> Self {
        Self { x_start, x_end, y }
    }

    /// Get the total number of pixels in this chunk.
    pub fn pixel_count(&self) -> u32 {
        self.x_end - self.x_start
    }
}

/// Generate the chunks of a `width` x `height` image in row-major order.
///
/// The last chunk of each row is shorter when `chunk_length` does not divide
/// `width`. A zero `chunk_length` is treated as 1.
pub fn generate_chunks(width: u32, height: u32, chunk_length: u32) -> Vec<Chunk> {
    let chunk_length = chunk_length.max(1);
    let per_row = width.div_ceil(chunk_length) as usize;
    let mut chunks = Vec::with_capacity(per_row * height as usize);

    for y in 0..height {
        let mut x = 0;
        while x < width {
            let x_end = (x + chunk_length).min(width);
            chunks.push(Chunk::new(x, x_end, y));
            x = x_end;
        }
    }

    chunks
}

/// Result of rendering a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkResult {
    /// Pixels written
    pub pixels: u32,
    /// Successful nearest-hit queries
    pub hits: u64,
}

/// Trace every pixel of `chunk` and store it in `buffer`.
pub fn render_chunk(
    chunk: &Chunk,
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    buffer: &FrameBuffer,
) -> ChunkResult {
    let mut hits = 0u64;

    for x in chunk.x_start..chunk.x_end {
        let traced = render_pixel(scene, camera, x, chunk.y, config);
        hits += u64::from(traced.hits);
        write_pixel(buffer, x, chunk.y, traced.color);
    }

    ChunkResult {
        pixels: chunk.pixel_count(),
        hits,
    }
}
