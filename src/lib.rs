//! d3-rasterizer: a CPU triangle rasterizer
//!
//! Meshes are appended to a shared geometry store and grouped into scene
//! objects; each frame the renderer projects them through a pinhole camera
//! and fills a z-buffered framebuffer with flat or perspective-correct
//! textured triangles.

pub mod config;
pub mod loader;
pub mod rasterizer;
pub mod renderer;
pub mod scene;

pub use config::{load_config, save_config, ConfigError, RenderConfig};
pub use loader::{LoadError, MeshData};
pub use renderer::Renderer;
pub use scene::{ObjectId, SceneGraph};
