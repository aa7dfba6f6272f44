//! Chunked tile storage, spatial queries, and chunk vertex buffers.
#![forbid(unsafe_code)]

mod buffer;
mod chunk;
mod collision;
mod coord;
mod device;
mod map;
mod strategy;

pub use buffer::{ChunkBuffers, MapVertex, VertexBuffer};
pub use chunk::TileChunk;
pub use collision::{RayHitPoint, TileHit};
pub use coord::{ChunkCoord, ChunkDims, ChunkIndex, ChunkRange, TileCoord, TileRange};
pub use device::{BufferId, DeviceBuffer, GraphicsDevice, NullDevice, RecordingDevice, SharedDevice};
pub use map::{RebuildReport, TileMap};
pub use strategy::{ChunkMesher, LightPropagator, LightSettings, MeshStats, Strategies};
