//! Asset loading: turns files into data the core can append
//!
//! Nothing here touches the renderer directly. Loaders produce mesh-local
//! data; `MeshData::rebase` shifts it onto the geometry store's offsets.

mod obj;

pub use obj::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::rasterizer::{Face, Uv, Vec3, Vec4};
use crate::scene::GeometryOffsets;

/// Errors from asset loading
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("obj line {line}: {message}")]
    Obj { line: usize, message: String },
}

/// Vertex, uv, normal and face sequences for one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec4>,
    pub uvs: Vec<Uv>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl MeshData {
    /// Shift 0-based mesh-local indices so they point past geometry
    /// already held by the store
    pub fn rebase(mut self, offsets: GeometryOffsets) -> Self {
        for face in &mut self.faces {
            for corner in &mut face.corners {
                *corner = corner.offset(offsets.vertex, offsets.uv, offsets.normal);
            }
        }
        self
    }

    /// Every face index resolves inside this mesh's own arrays
    pub fn indices_in_bounds(&self) -> bool {
        self.faces.iter().flat_map(|f| f.corners.iter()).all(|c| {
            c.v_index < self.vertices.len() && c.uv_index < self.uvs.len() && c.n_index < self.normals.len()
        })
    }

    pub fn with_texture(mut self, texture_id: Option<usize>) -> Self {
        for face in &mut self.faces {
            face.texture_id = texture_id;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::IndexRecord;

    #[test]
    fn test_rebase_shifts_every_corner() {
        let mesh = MeshData {
            vertices: vec![Vec4::point(0.0, 0.0, 0.0); 3],
            uvs: vec![Uv::default(); 3],
            normals: vec![Vec3::ZERO],
            faces: vec![Face::new([
                IndexRecord::new(0, 0, 0),
                IndexRecord::new(1, 1, 0),
                IndexRecord::new(2, 2, 0),
            ])],
        };
        assert!(mesh.indices_in_bounds());
        let rebased = mesh.rebase(GeometryOffsets { vertex: 10, uv: 4, normal: 2, face: 7 });
        assert_eq!(rebased.faces[0].corners[2], IndexRecord::new(12, 6, 2));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = crate::rasterizer::Texture::from_file("/definitely/missing/file.png").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing/file.png"));
    }
}
