use std::ops::AddAssign;
use std::rc::Rc;

use tessel_tiles::LIGHT_MAX;

use crate::buffer::ChunkBuffers;
use crate::coord::ChunkIndex;
use crate::map::TileMap;

/// Vertex counts written by one meshing pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub opaque_vertices: usize,
    pub alpha_vertices: usize,
    /// Cube faces (or whole arbitrary meshes) skipped as hidden.
    pub faces_culled: usize,
}

impl MeshStats {
    #[inline]
    pub fn total_vertices(&self) -> usize {
        self.opaque_vertices + self.alpha_vertices
    }
}

impl AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: MeshStats) {
        self.opaque_vertices += rhs.opaque_vertices;
        self.alpha_vertices += rhs.alpha_vertices;
        self.faces_culled += rhs.faces_culled;
    }
}

/// Turns one chunk's tiles into vertex streams.
pub trait ChunkMesher {
    /// `out` arrives cleared; the map commits it to the device afterwards.
    fn generate(&self, map: &TileMap, chunk: ChunkIndex, out: &mut ChunkBuffers) -> MeshStats;

    /// Whether emitted vertices change when only lighting changes.
    fn depends_on_light(&self) -> bool {
        false
    }
}

/// Recomputes both light channels for the whole map.
pub trait LightPropagator {
    fn propagate(&self, map: &mut TileMap);
}

/// Map-wide light constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightSettings {
    /// Floor for the tile-light channel.
    pub ambient: u8,
    /// Value given to tiles directly exposed to the sky.
    pub sky: u8,
}

impl LightSettings {
    #[inline]
    pub fn new(ambient: u8, sky: u8) -> Self {
        Self {
            ambient: ambient.min(LIGHT_MAX),
            sky: sky.min(LIGHT_MAX),
        }
    }
}

impl Default for LightSettings {
    fn default() -> Self {
        Self::new(0, LIGHT_MAX)
    }
}

/// The swappable algorithms a map runs.
#[derive(Clone)]
pub struct Strategies {
    pub mesher: Rc<dyn ChunkMesher>,
    pub lighter: Rc<dyn LightPropagator>,
}

impl Strategies {
    pub fn new(mesher: impl ChunkMesher + 'static, lighter: impl LightPropagator + 'static) -> Self {
        Self {
            mesher: Rc::new(mesher),
            lighter: Rc::new(lighter),
        }
    }
}
