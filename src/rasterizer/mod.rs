//! Software rasterizer core
//!
//! - Incremental (Bresenham) edge stepping, one span per row
//! - Perspective-correct texture mapping through 1/z
//! - Z-buffered color target, flat debug color for untextured faces

mod math;
mod types;
mod line;
mod framebuffer;
mod render;

pub use math::*;
pub use types::*;
pub use line::*;
pub use framebuffer::*;
pub use render::*;

/// Default render target size
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
