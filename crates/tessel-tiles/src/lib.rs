//! Tile records, tile mesh definitions, and the mesh registry.
#![forbid(unsafe_code)]

pub mod config;
pub mod import;
pub mod mesh;
pub mod registry;
pub mod types;

pub use config::TileConfigError;
pub use import::{AtlasMap, ImportedMesh, MeshSubset, TileMeshError};
pub use mesh::{
    AtlasRect, CUBE_FACE_VERTICES, CubeFaces, CubeStyle, MeshProperties, MeshShape,
    TileMeshDefinition, TileVertex,
};
pub use registry::TileMeshRegistry;
pub use types::{
    Facing, LIGHT_MAX, LightChannel, MeshIndex, Rgba, Side, SideMask, Tile, TileFlags,
};
