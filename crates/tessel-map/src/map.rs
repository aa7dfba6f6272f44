use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tessel_geom::{Aabb, Ray, Vec3};
use tessel_tiles::{Side, Tile, TileMeshRegistry};

use crate::chunk::{TileChunk, overlap_range};
use crate::collision::{self, RayHitPoint, TileHit};
use crate::coord::{ChunkCoord, ChunkDims, ChunkIndex, ChunkRange, TileCoord, TileRange};
use crate::device::SharedDevice;
use crate::strategy::{ChunkMesher, LightPropagator, LightSettings, MeshStats, Strategies};

/// Outcome of [`TileMap::rebuild_dirty`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub relit: bool,
    pub chunks_rebuilt: usize,
    pub stats: MeshStats,
}

/// A grid of equally sized chunks covering `[0, size)` on every axis.
pub struct TileMap {
    registry: Arc<TileMeshRegistry>,
    device: SharedDevice,
    strategies: Strategies,
    light: LightSettings,
    chunk_dims: ChunkDims,
    grid: ChunkDims,
    chunks: Vec<TileChunk>,
    bounds: Aabb,
    lighting_dirty: bool,
}

impl core::fmt::Debug for TileMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileMap")
            .field("chunk_dims", &self.chunk_dims)
            .field("grid", &self.grid)
            .field("light", &self.light)
            .field("lighting_dirty", &self.lighting_dirty)
            .finish_non_exhaustive()
    }
}

impl TileMap {
    /// An empty map; call [`TileMap::resize`] before storing tiles.
    pub fn new(
        registry: Arc<TileMeshRegistry>,
        device: SharedDevice,
        strategies: Strategies,
        light: LightSettings,
    ) -> Self {
        Self {
            registry,
            device,
            strategies,
            light,
            chunk_dims: ChunkDims::default(),
            grid: ChunkDims::default(),
            chunks: Vec::new(),
            bounds: Aabb::new(Vec3::ZERO, Vec3::ZERO),
            lighting_dirty: false,
        }
    }

    /// Destroys every chunk and recreates `chunks_x * chunks_y * chunks_z`
    /// empty chunks of `dims` tiles each.
    pub fn resize(&mut self, chunks_x: usize, chunks_y: usize, chunks_z: usize, dims: ChunkDims) {
        let grid = ChunkDims::new(chunks_x, chunks_y, chunks_z);
        assert!(!grid.is_degenerate(), "chunk grid {grid:?} must be non-empty");
        assert!(!dims.is_degenerate(), "chunk dims {dims:?} must be non-empty");
        // Old buffers release before new ones register.
        self.chunks.clear();
        self.chunks.reserve_exact(grid.volume());
        for i in 0..grid.volume() {
            let (cx, cy, cz) = grid.delinear(i);
            self.chunks.push(TileChunk::new(
                ChunkIndex(i),
                ChunkCoord::new(cx, cy, cz),
                dims,
                &self.device,
            ));
        }
        self.grid = grid;
        self.chunk_dims = dims;
        let size = self.size();
        self.bounds = Aabb::new(Vec3::ZERO, Vec3::new(size.x as f32, size.y as f32, size.z as f32));
        self.lighting_dirty = true;
        log::info!(
            "tile map resized: {}x{}x{} chunks of {}x{}x{} tiles",
            grid.x,
            grid.y,
            grid.z,
            dims.x,
            dims.y,
            dims.z
        );
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TileMeshRegistry> {
        &self.registry
    }

    #[inline]
    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    #[inline]
    pub fn light_settings(&self) -> LightSettings {
        self.light
    }

    pub fn set_light_settings(&mut self, light: LightSettings) {
        if light != self.light {
            self.light = light;
            self.lighting_dirty = true;
        }
    }

    #[inline]
    pub fn mesher(&self) -> &Rc<dyn ChunkMesher> {
        &self.strategies.mesher
    }

    #[inline]
    pub fn lighter(&self) -> &Rc<dyn LightPropagator> {
        &self.strategies.lighter
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Map extent in tiles.
    #[inline]
    pub fn size(&self) -> ChunkDims {
        ChunkDims::new(
            self.grid.x * self.chunk_dims.x,
            self.grid.y * self.chunk_dims.y,
            self.grid.z * self.chunk_dims.z,
        )
    }

    #[inline]
    pub fn chunk_dims(&self) -> ChunkDims {
        self.chunk_dims
    }

    /// Chunk grid extent.
    #[inline]
    pub fn grid(&self) -> ChunkDims {
        self.grid
    }

    #[inline]
    pub fn chunk(&self, index: ChunkIndex) -> &TileChunk {
        &self.chunks[index.0]
    }

    #[inline]
    pub fn chunks(&self) -> &[TileChunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunk_at(&self, coord: ChunkCoord) -> Option<&TileChunk> {
        if coord.cx >= self.grid.x || coord.cy >= self.grid.y || coord.cz >= self.grid.z {
            return None;
        }
        Some(&self.chunks[self.grid.linear(coord.cx, coord.cy, coord.cz)])
    }

    #[inline]
    pub fn contains(&self, c: TileCoord) -> bool {
        let size = self.size();
        c.x >= 0
            && c.y >= 0
            && c.z >= 0
            && (c.x as usize) < size.x
            && (c.y as usize) < size.y
            && (c.z as usize) < size.z
    }

    /// Owning chunk and local coordinate of a global tile coordinate.
    #[inline]
    pub fn locate(&self, c: TileCoord) -> Option<(ChunkIndex, (usize, usize, usize))> {
        if !self.contains(c) {
            return None;
        }
        let d = self.chunk_dims;
        let (x, y, z) = (c.x as usize, c.y as usize, c.z as usize);
        let idx = self.grid.linear(x / d.x, y / d.y, z / d.z);
        Some((ChunkIndex(idx), (x % d.x, y % d.y, z % d.z)))
    }

    #[inline]
    pub fn chunk_index_for(&self, c: TileCoord) -> Option<ChunkIndex> {
        self.locate(c).map(|(i, _)| i)
    }

    #[inline]
    pub fn get(&self, c: TileCoord) -> Option<&Tile> {
        let (i, (x, y, z)) = self.locate(c)?;
        Some(self.chunks[i.0].tile_local(x, y, z))
    }

    /// Mutable access without dirty tracking; use [`TileMap::set_tile`] for
    /// edits that should be re-meshed.
    #[inline]
    pub fn get_mut(&mut self, c: TileCoord) -> Option<&mut Tile> {
        let (i, (x, y, z)) = self.locate(c)?;
        Some(self.chunks[i.0].tile_local_mut(x, y, z))
    }

    #[inline]
    pub fn tile(&self, c: TileCoord) -> &Tile {
        match self.get(c) {
            Some(t) => t,
            None => panic!("tile {c:?} outside map of size {:?}", self.size()),
        }
    }

    #[inline]
    pub fn tile_mut(&mut self, c: TileCoord) -> &mut Tile {
        let size = self.size();
        match self.get_mut(c) {
            Some(t) => t,
            None => panic!("tile {c:?} outside map of size {size:?}"),
        }
    }

    /// Replaces a tile and returns the previous one. The owning chunk, any
    /// chunk sharing a face with the tile, and lighting are marked dirty.
    pub fn set_tile(&mut self, c: TileCoord, tile: Tile) -> Tile {
        let prev = std::mem::replace(self.tile_mut(c), tile);
        if let Some(owner) = self.chunk_index_for(c) {
            self.chunks[owner.0].mark_dirty();
            for side in Side::ALL {
                if let Some(n) = self.chunk_index_for(c.step(side)) {
                    if n != owner {
                        self.chunks[n.0].mark_dirty();
                    }
                }
            }
        }
        self.lighting_dirty = true;
        prev
    }

    /// Every tile with its global coordinate, chunk by chunk.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.chunks.iter().flat_map(|c| c.iter())
    }

    /// Bulk mutable access for light propagation. No dirty tracking.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = (TileCoord, &mut Tile)> + '_ {
        self.chunks.iter_mut().flat_map(|c| c.iter_mut())
    }

    pub fn get_overlapped_tiles(&self, query: &Aabb) -> Option<TileRange> {
        overlap_range(&self.bounds, TileCoord::default(), self.size(), query)
    }

    pub fn get_overlapped_chunks(&self, query: &Aabb) -> Option<ChunkRange> {
        let tiles = self.get_overlapped_tiles(query)?;
        let d = self.chunk_dims;
        let to_chunk = |c: TileCoord| {
            ChunkCoord::new(c.x as usize / d.x, c.y as usize / d.y, c.z as usize / d.z)
        };
        Some(ChunkRange {
            min: to_chunk(tiles.min),
            max: to_chunk(tiles.max),
        })
    }

    /// First collidable tile along the ray.
    pub fn check_for_collision(&self, ray: &Ray) -> Option<TileHit> {
        let size = self.size();
        collision::traverse(ray, TileCoord::default(), (size.x, size.y, size.z), |c| {
            self.get(c).is_some_and(Tile::is_collidable)
        })
    }

    /// Closest intersection with the collision triangles of the tile at `c`,
    /// as the hit point and ray parameter.
    pub fn check_for_collision_with_tile(&self, ray: &Ray, c: TileCoord) -> Option<(Vec3, f32)> {
        let tile = self.get(c)?;
        collision::intersect_tile(ray, c, tile, &self.registry)
    }

    /// Traverses the map and stops at the first collidable tile whose
    /// triangles the ray actually hits.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHitPoint> {
        let size = self.size();
        let mut found = None;
        let hit = collision::traverse(ray, TileCoord::default(), (size.x, size.y, size.z), |c| {
            let Some(tile) = self.get(c).filter(|t| t.is_collidable()) else {
                return false;
            };
            found = collision::intersect_tile(ray, c, tile, &self.registry);
            found.is_some()
        })?;
        let (point, t) = found?;
        Some(RayHitPoint { tile: hit, point, t })
    }

    #[inline]
    pub fn is_lighting_dirty(&self) -> bool {
        self.lighting_dirty
    }

    /// Invalidates every chunk and the lighting, e.g. after bulk writes
    /// through [`TileMap::tiles_mut`].
    pub fn mark_all_dirty(&mut self) {
        self.mark_chunks_dirty();
        self.lighting_dirty = true;
    }

    fn mark_chunks_dirty(&mut self) {
        for c in &mut self.chunks {
            c.mark_dirty();
        }
    }

    pub fn recompute_lighting(&mut self) {
        let lighter = Rc::clone(&self.strategies.lighter);
        let start = Instant::now();
        lighter.propagate(self);
        self.lighting_dirty = false;
        if self.strategies.mesher.depends_on_light() {
            self.mark_chunks_dirty();
        }
        log::debug!(
            target: "perf",
            "ms={:.2} light_propagate tiles={}",
            start.elapsed().as_secs_f64() * 1000.0,
            self.size().volume()
        );
    }

    /// Rebuilds one chunk's vertex buffers and uploads them.
    pub fn generate_vertices(&mut self, index: ChunkIndex) -> MeshStats {
        let mesher = Rc::clone(&self.strategies.mesher);
        let mut buffers = self.chunks[index.0].take_buffers();
        buffers.clear();
        let stats = mesher.generate(self, index, &mut buffers);
        buffers.release_unused_alpha();
        buffers.commit();
        self.chunks[index.0].install_buffers(buffers);
        stats
    }

    pub fn generate_all_vertices(&mut self) -> MeshStats {
        let mut total = MeshStats::default();
        for i in 0..self.chunks.len() {
            total += self.generate_vertices(ChunkIndex(i));
        }
        total
    }

    /// Relights if any edit happened since the last pass, then re-meshes only
    /// the dirty chunks.
    pub fn rebuild_dirty(&mut self) -> RebuildReport {
        let start = Instant::now();
        let mut report = RebuildReport::default();
        if self.lighting_dirty {
            self.recompute_lighting();
            report.relit = true;
        }
        for i in 0..self.chunks.len() {
            if self.chunks[i].is_dirty() {
                report.stats += self.generate_vertices(ChunkIndex(i));
                report.chunks_rebuilt += 1;
            }
        }
        log::debug!(
            target: "perf",
            "ms={:.2} rebuild chunks={} verts={} relit={}",
            start.elapsed().as_secs_f64() * 1000.0,
            report.chunks_rebuilt,
            report.stats.total_vertices(),
            report.relit
        );
        report
    }
}
