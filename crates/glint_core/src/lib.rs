//! Glint Core - geometry import for the Glint ray tracer.
//!
//! This crate provides:
//!
//! - **Vertex data**: `Vertex` (position + normal) and `TriangleVertices`
//! - **OBJ import**: triangulated, flattened triangle lists via `tobj`
//!
//! # Example
//!
//! ```ignore
//! use glint_core::load_triangles;
//!
//! let triangles = load_triangles("assets/bunny.obj")?;
//! println!("Loaded {} triangles", triangles.len());
//! ```

pub mod import;

// Re-export commonly used types
pub use import::{load_triangles, triangles_from_obj_reader, ImportError, TriangleVertices, Vertex};
