//! Renderer: owns the scene data and turns it into a framebuffer each frame
//!
//! A frame runs in three stages:
//! 1. `transform_vertices` projects every referenced vertex into viewport space
//! 2. `draw_triangles` culls and fills faces object by object, in face order
//! 3. `draw_wireframe` optionally overlays triangle edges

use std::path::Path;

use crate::config::{ConfigError, RenderConfig};
use crate::loader::{self, LoadError, MeshData};
use crate::rasterizer::{
    clip_to_viewport, fill_triangle, Color, Face, Fill, Framebuffer, IndexRange, Mat4, RasterVertex, Texture,
    Transform, Uv, Vec3, Vec4,
};
use crate::scene::{cube_mesh, quad_mesh, GeometryStore, ObjectId, SceneGraph};

/// Projected coordinates further than this many viewport sizes from the
/// screen are treated as garbage
const GUARD_BAND: f32 = 16.0;

pub struct Renderer {
    /// Read every frame; changes apply on the next `render_frame`
    pub config: RenderConfig,
    geometry: GeometryStore,
    scene: SceneGraph,
    textures: Vec<Texture>,
    framebuffer: Framebuffer,
    /// Viewport-space position per vertex, rebuilt by `transform_vertices`
    viewport: Vec<Vec4>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        let framebuffer = Framebuffer::new(config.width, config.height);
        let scene = SceneGraph::new(config.camera);
        Self {
            config,
            geometry: GeometryStore::new(),
            scene,
            textures: Vec::new(),
            framebuffer,
            viewport: Vec::new(),
        }
    }

    /// Register a texture, returning its id for `Face::texture_id`
    pub fn push_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn append_vertices(&mut self, vertices: &[Vec4]) {
        self.geometry.append_vertices(vertices);
    }

    pub fn append_uvs(&mut self, uvs: &[Uv]) {
        self.geometry.append_uvs(uvs);
    }

    pub fn append_normals(&mut self, normals: &[Vec3]) {
        self.geometry.append_normals(normals);
    }

    /// Append faces whose indices are already absolute. Texture ids must
    /// refer to registered textures.
    pub fn append_faces(&mut self, faces: &[Face]) {
        self.check_texture_ids(faces);
        self.geometry.append_faces(faces);
    }

    pub fn create_object(&mut self, name: impl Into<String>, transform: Transform, range: IndexRange) -> ObjectId {
        self.scene.create_object(name, transform, range)
    }

    fn check_texture_ids(&self, faces: &[Face]) {
        for face in faces {
            if let Some(id) = face.texture_id {
                assert!(
                    id < self.textures.len(),
                    "face uses texture {} but only {} textures are registered",
                    id,
                    self.textures.len()
                );
            }
        }
    }

    /// Append a mesh with 0-based local indices as a new object
    pub fn push_mesh(&mut self, name: impl Into<String>, mesh: MeshData, transform: Transform) -> ObjectId {
        self.check_texture_ids(&mesh.faces);
        let offsets = self.geometry.offsets();
        let mesh = mesh.rebase(offsets);

        self.geometry.append_vertices(&mesh.vertices);
        self.geometry.append_uvs(&mesh.uvs);
        self.geometry.append_normals(&mesh.normals);
        self.geometry.append_faces(&mesh.faces);

        self.scene
            .create_object(name, transform, IndexRange::new(offsets.face, mesh.faces.len()))
    }

    pub fn push_cube(&mut self, side: f32, transform: Transform, texture: Option<usize>) -> ObjectId {
        self.push_mesh("cube", cube_mesh(side).with_texture(texture), transform)
    }

    pub fn push_quad(&mut self, width: f32, height: f32, transform: Transform, texture: Option<usize>) -> ObjectId {
        self.push_mesh("quad", quad_mesh(width, height).with_texture(texture), transform)
    }

    /// Load a Wavefront OBJ file as a new object
    pub fn load_obj<P: AsRef<Path>>(
        &mut self,
        path: P,
        transform: Transform,
        texture: Option<usize>,
    ) -> Result<ObjectId, LoadError> {
        let path = path.as_ref();
        let mesh = loader::load_obj(path)?.with_texture(texture);
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "mesh".to_string());
        Ok(self.push_mesh(name, mesh, transform))
    }

    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) {
        self.scene.set_transform(id, transform);
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Viewport-space vertices from the last `transform_vertices`
    pub fn viewport(&self) -> &[Vec4] {
        &self.viewport
    }

    /// Project every vertex referenced by an object's faces into viewport
    /// space. `x`, `y` are pixels, `z` is view depth, `w` is NDC depth.
    pub fn transform_vertices(&mut self) {
        let config = &self.config;
        let (width, height) = (config.width, config.height);

        self.viewport.clear();
        self.viewport.resize(self.geometry.vertices().len(), Vec4::ZERO);

        let projection = Mat4::perspective(config.fov, config.aspect(), config.near_clip, config.far_clip);
        let camera = self.scene.camera();
        let view_projection = projection * Mat4::view(camera.position, camera.angles);

        let vertices = self.geometry.vertices();
        let faces = self.geometry.faces();
        for (_, transform, range) in self.scene.iter() {
            let mvp = view_projection * transform.model_matrix();
            for face in &faces[range.start..range.end()] {
                for corner in &face.corners {
                    let clip = mvp.transform(vertices[corner.v_index]);
                    self.viewport[corner.v_index] = clip_to_viewport(clip, width, height);
                }
            }
        }
    }

    /// Cull and fill every face. Expects `transform_vertices` to have run.
    pub fn draw_triangles(&mut self) {
        let (near, far) = (self.config.near_clip, self.config.far_clip);
        let (width, height) = (self.framebuffer.width as f32, self.framebuffer.height as f32);
        let debug_color = self.config.debug_color;

        let faces = self.geometry.faces();
        let uvs = self.geometry.uvs();

        for (id, _, range) in self.scene.iter() {
            for face_index in range.iter() {
                let face = &faces[face_index];
                let [a, b, c] = face.corners.map(|corner| self.viewport[corner.v_index]);

                if is_backfacing(a, b, c) {
                    continue;
                }
                if !within_depth(&[a, b, c], near, far) {
                    continue;
                }
                if !within_guard_band(&[a, b, c], width, height) {
                    log::trace!("face {} of {:?}: projected outside guard band, skipped", face_index, id);
                    continue;
                }

                let corners = [a, b, c];
                let vertices: [RasterVertex; 3] = std::array::from_fn(|i| {
                    let p = corners[i];
                    RasterVertex::new(p.x, p.y, p.z, uvs[face.corners[i].uv_index])
                });

                let fill = match face.texture_id {
                    None => Fill::Flat(debug_color),
                    Some(texture_id) => match self.textures.get(texture_id) {
                        Some(texture) => Fill::Textured(texture),
                        None => {
                            log::error!("face {} references missing texture {}", face_index, texture_id);
                            Fill::Flat(debug_color)
                        }
                    },
                };
                fill_triangle(&mut self.framebuffer, vertices, fill);
            }
        }
    }

    /// Overlay the edges of every face inside the clip range
    pub fn draw_wireframe(&mut self, color: Color) {
        let (near, far) = (self.config.near_clip, self.config.far_clip);
        let (width, height) = (self.framebuffer.width as f32, self.framebuffer.height as f32);

        for (_, _, range) in self.scene.iter() {
            for face in &self.geometry.faces()[range.start..range.end()] {
                let corners = face.corners.map(|corner| self.viewport[corner.v_index]);
                if !within_depth(&corners, near, far) || !within_guard_band(&corners, width, height) {
                    continue;
                }
                for i in 0..3 {
                    let p = corners[i];
                    let q = corners[(i + 1) % 3];
                    self.framebuffer.draw_line(
                        p.x.round() as i32,
                        p.y.round() as i32,
                        q.x.round() as i32,
                        q.y.round() as i32,
                        color,
                    );
                }
            }
        }
    }

    /// Render one frame using the current config
    pub fn render_frame(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;

        self.framebuffer.resize(self.config.width, self.config.height);
        self.framebuffer.clear(self.config.clear_color);
        self.framebuffer.reset_depth(self.config.far_clip);

        self.transform_vertices();
        self.draw_triangles();
        if self.config.wireframe {
            self.draw_wireframe(self.config.wire_color);
        }
        Ok(())
    }
}

/// Viewport-space normal faces away from the viewer (or the face has no area)
fn is_backfacing(a: Vec4, b: Vec4, c: Vec4) -> bool {
    let (a, b, c) = (a.xyz(), b.xyz(), c.xyz());
    let normal = (a - b).cross(c - a).normalize();
    Vec3::new(0.0, 0.0, -1.0).dot(normal) >= 0.0
}

fn within_depth(corners: &[Vec4; 3], near: f32, far: f32) -> bool {
    corners.iter().all(|p| p.z > near && p.z < far)
}

fn within_guard_band(corners: &[Vec4; 3], width: f32, height: f32) -> bool {
    corners.iter().all(|p| {
        p.is_finite()
            && p.x.abs() <= GUARD_BAND * width
            && p.y.abs() <= GUARD_BAND * height
    })
}
