//! Triangle-soup import from Wavefront OBJ files.
//!
//! The ray tracer does not keep indexed meshes around: a mesh is just an
//! ordered list of triangles, each carrying three (position, normal) vertices.
//! This module flattens every model of an OBJ file into that form. Files
//! without normals get smooth per-vertex normals computed by averaging the
//! face normals around each vertex.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use glint_math::Vec3;
use thiserror::Error;

/// A mesh vertex: position and (unit) shading normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// The three vertices of one triangle, counter-clockwise when seen from the front.
pub type TriangleVertices = [Vertex; 3];

/// Errors that can occur while importing geometry.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to load OBJ file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ parse error: {0}")]
    Parse(#[from] tobj::LoadError),

    #[error("No triangles found in {0}")]
    NoGeometry(String),

    #[error("Face references vertex {index} but the model has {vertex_count} vertices")]
    IndexOutOfRange { index: usize, vertex_count: usize },
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Load every triangle of an OBJ file.
///
/// Fails if the file is unreadable, malformed, or contains no faces.
pub fn load_triangles<P: AsRef<Path>>(path: P) -> Result<Vec<TriangleVertices>, ImportError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options()).map_err(|source| match source {
        tobj::LoadError::OpenFileFailed | tobj::LoadError::ReadError => ImportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => ImportError::Parse(other),
    })?;

    let triangles = flatten_models(&models, &path.display().to_string())?;
    log::info!("Loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}

/// Load every triangle from OBJ text. Material libraries are ignored.
pub fn triangles_from_obj_reader<R: BufRead>(reader: &mut R) -> Result<Vec<TriangleVertices>, ImportError> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))?;
    flatten_models(&models, "<buffer>")
}

fn flatten_models(models: &[tobj::Model], source: &str) -> Result<Vec<TriangleVertices>, ImportError> {
    let mut triangles = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let positions: Vec<Vec3> = mesh.positions.chunks_exact(3).map(Vec3::from_slice).collect();

        let has_normals = mesh.normals.len() == mesh.positions.len();
        log::debug!("Model '{}' has normals: {}", model.name, has_normals);

        let normals = if has_normals {
            mesh.normals
                .chunks_exact(3)
                .map(|n| Vec3::from_slice(n).normalize_or_zero())
                .collect()
        } else {
            compute_vertex_normals(&positions, &mesh.indices)?
        };

        for face in mesh.indices.chunks_exact(3) {
            let mut vertices = [Vertex::new(Vec3::ZERO, Vec3::Y); 3];
            for (slot, &index) in vertices.iter_mut().zip(face) {
                let index = index as usize;
                let position = *positions.get(index).ok_or(ImportError::IndexOutOfRange {
                    index,
                    vertex_count: positions.len(),
                })?;
                *slot = Vertex::new(position, normals[index]);
            }
            triangles.push(vertices);
        }
    }

    if triangles.is_empty() {
        return Err(ImportError::NoGeometry(source.to_string()));
    }

    Ok(triangles)
}

/// Compute smooth vertex normals by averaging the normals of adjacent faces.
///
/// Vertices not referenced by any face keep a +Y normal.
fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Result<Vec<Vec3>, ImportError> {
    let vertex_count = positions.len();
    let mut normals = vec![Vec3::ZERO; vertex_count];

    // Accumulate face normals at each vertex
    for face in indices.chunks_exact(3) {
        let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if let Some(&index) = [i0, i1, i2].iter().find(|&&i| i >= vertex_count) {
            return Err(ImportError::IndexOutOfRange { index, vertex_count });
        }

        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let face_normal = edge1.cross(edge2);

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    Ok(normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect())
}
