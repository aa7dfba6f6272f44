//! CPU visibility meshing: per-tile face culling into chunk vertex buffers.
#![forbid(unsafe_code)]

mod emit;
mod shading;
mod visibility;

pub use shading::{LIT_FLOOR, LightShading, TileShading, Unlit};
pub use visibility::{LitVisibilityMesher, VisibilityMesher};
