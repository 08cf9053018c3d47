//! Geometry store: flat, append-only arrays shared by every mesh
//!
//! Faces index into the vertex/uv/normal arrays by absolute position, so a
//! caller appending a new mesh must first read `offsets()` and rebase its
//! indices onto them.

use crate::rasterizer::{Face, Uv, Vec3, Vec4};

/// Lengths of the store's arrays at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryOffsets {
    pub vertex: usize,
    pub uv: usize,
    pub normal: usize,
    pub face: usize,
}

/// World-space vertex positions, uvs, normals and triangles for all meshes
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    vertices: Vec<Vec4>,
    uvs: Vec<Uv>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_vertices(&mut self, vertices: &[Vec4]) {
        self.vertices.extend_from_slice(vertices);
    }

    pub fn append_uvs(&mut self, uvs: &[Uv]) {
        self.uvs.extend_from_slice(uvs);
    }

    pub fn append_normals(&mut self, normals: &[Vec3]) {
        self.normals.extend_from_slice(normals);
    }

    /// Append triangles. Every index must already resolve; checked in debug builds.
    pub fn append_faces(&mut self, faces: &[Face]) {
        for face in faces {
            for corner in &face.corners {
                debug_assert!(
                    corner.v_index < self.vertices.len(),
                    "face vertex index {} out of bounds ({} vertices)",
                    corner.v_index,
                    self.vertices.len()
                );
                debug_assert!(
                    corner.uv_index < self.uvs.len(),
                    "face uv index {} out of bounds ({} uvs)",
                    corner.uv_index,
                    self.uvs.len()
                );
                debug_assert!(
                    corner.n_index < self.normals.len(),
                    "face normal index {} out of bounds ({} normals)",
                    corner.n_index,
                    self.normals.len()
                );
            }
        }
        self.faces.extend_from_slice(faces);
    }

    pub fn offsets(&self) -> GeometryOffsets {
        GeometryOffsets {
            vertex: self.vertices.len(),
            uv: self.uvs.len(),
            normal: self.normals.len(),
            face: self.faces.len(),
        }
    }

    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Uv] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}
