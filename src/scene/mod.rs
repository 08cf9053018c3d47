//! Scene data: geometry arrays, the object table and built-in meshes

mod geometry;
mod graph;
mod primitives;

pub use geometry::*;
pub use graph::*;
pub use primitives::*;
