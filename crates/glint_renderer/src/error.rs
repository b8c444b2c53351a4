//! Error types for the renderer.

use thiserror::Error;

/// Errors raised by the frame buffer and the worker pool.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} frame")]
    PixelOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("Failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),
}
