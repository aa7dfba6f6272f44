use tessel_geom::{Aabb, Ray, Vec3};
use tessel_tiles::Tile;

use crate::buffer::ChunkBuffers;
use crate::collision::{self, TileHit};
use crate::coord::{ChunkCoord, ChunkDims, ChunkIndex, TileCoord, TileRange};
use crate::device::SharedDevice;
use crate::map::TileMap;

/// A fixed-size block of tiles plus the vertex buffers built from them.
///
/// A chunk never outlives its map and holds no reference back to it; calls that
/// may cross into a neighbouring chunk take the owning [`TileMap`] explicitly.
#[derive(Debug)]
pub struct TileChunk {
    index: ChunkIndex,
    coord: ChunkCoord,
    origin: TileCoord,
    dims: ChunkDims,
    bounds: Aabb,
    tiles: Vec<Tile>,
    buffers: ChunkBuffers,
    dirty: bool,
}

impl TileChunk {
    pub(crate) fn new(index: ChunkIndex, coord: ChunkCoord, dims: ChunkDims, device: &SharedDevice) -> Self {
        let origin = TileCoord::new(
            (coord.cx * dims.x) as i32,
            (coord.cy * dims.y) as i32,
            (coord.cz * dims.z) as i32,
        );
        let lo = origin.to_vec3();
        let bounds = Aabb::new(lo, lo + Vec3::new(dims.x as f32, dims.y as f32, dims.z as f32));
        Self {
            index,
            coord,
            origin,
            dims,
            bounds,
            tiles: vec![Tile::EMPTY; dims.volume()],
            buffers: ChunkBuffers::new(device),
            dirty: true,
        }
    }

    #[inline]
    pub fn index(&self) -> ChunkIndex {
        self.index
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Global coordinate of the minimum corner tile.
    #[inline]
    pub fn origin(&self) -> TileCoord {
        self.origin
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[inline]
    pub fn local_index(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.dims.x && y < self.dims.y && z < self.dims.z,
            "local tile ({x}, {y}, {z}) outside chunk dims {:?}",
            self.dims
        );
        self.dims.linear(x, y, z)
    }

    #[inline]
    pub fn tile_local(&self, x: usize, y: usize, z: usize) -> &Tile {
        &self.tiles[self.local_index(x, y, z)]
    }

    #[inline]
    pub fn tile_local_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Tile {
        let i = self.local_index(x, y, z);
        &mut self.tiles[i]
    }

    #[inline]
    pub fn contains(&self, c: TileCoord) -> bool {
        self.to_local(c).is_some()
    }

    #[inline]
    pub fn to_local(&self, c: TileCoord) -> Option<(usize, usize, usize)> {
        let lx = c.x - self.origin.x;
        let ly = c.y - self.origin.y;
        let lz = c.z - self.origin.z;
        if lx < 0 || ly < 0 || lz < 0 {
            return None;
        }
        let (lx, ly, lz) = (lx as usize, ly as usize, lz as usize);
        if lx >= self.dims.x || ly >= self.dims.y || lz >= self.dims.z {
            return None;
        }
        Some((lx, ly, lz))
    }

    #[inline]
    pub fn to_global(&self, x: usize, y: usize, z: usize) -> TileCoord {
        self.origin.offset(x as i32, y as i32, z as i32)
    }

    /// Tiles with their global coordinates, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let (origin, dims) = (self.origin, self.dims);
        self.tiles.iter().enumerate().map(move |(i, t)| {
            let (x, y, z) = dims.delinear(i);
            (origin.offset(x as i32, y as i32, z as i32), t)
        })
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (TileCoord, &mut Tile)> + '_ {
        let (origin, dims) = (self.origin, self.dims);
        self.tiles.iter_mut().enumerate().map(move |(i, t)| {
            let (x, y, z) = dims.delinear(i);
            (origin.offset(x as i32, y as i32, z as i32), t)
        })
    }

    /// Tile at `local + offset`, falling through to the map when the offset
    /// leaves this chunk. `None` outside the map.
    pub fn get_within_self_or_neighbour_safe<'a>(
        &'a self,
        map: &'a TileMap,
        local: (usize, usize, usize),
        offset: (i32, i32, i32),
    ) -> Option<&'a Tile> {
        let x = local.0 as i64 + offset.0 as i64;
        let y = local.1 as i64 + offset.1 as i64;
        let z = local.2 as i64 + offset.2 as i64;
        let inside = |v: i64, n: usize| v >= 0 && (v as usize) < n;
        if inside(x, self.dims.x) && inside(y, self.dims.y) && inside(z, self.dims.z) {
            return Some(self.tile_local(x as usize, y as usize, z as usize));
        }
        let global = self.to_global(local.0, local.1, local.2).offset(offset.0, offset.1, offset.2);
        map.get(global)
    }

    /// Like [`Self::get_within_self_or_neighbour_safe`], panicking outside the map.
    pub fn get_within_self_or_neighbour<'a>(
        &'a self,
        map: &'a TileMap,
        local: (usize, usize, usize),
        offset: (i32, i32, i32),
    ) -> &'a Tile {
        match self.get_within_self_or_neighbour_safe(map, local, offset) {
            Some(t) => t,
            None => panic!("neighbour {offset:?} of local tile {local:?} lies outside the map"),
        }
    }

    /// Inclusive range of this chunk's tiles overlapped by `query`.
    #[inline]
    pub fn overlapped_tiles(&self, query: &Aabb) -> Option<TileRange> {
        overlap_range(&self.bounds, self.origin, self.dims, query)
    }

    /// First collidable tile of this chunk along the ray.
    pub fn check_for_collision(&self, ray: &Ray) -> Option<TileHit> {
        collision::traverse(ray, self.origin, (self.dims.x, self.dims.y, self.dims.z), |c| {
            self.to_local(c)
                .is_some_and(|(x, y, z)| self.tile_local(x, y, z).is_collidable())
        })
    }

    #[inline]
    pub fn buffers(&self) -> &ChunkBuffers {
        &self.buffers
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn take_buffers(&mut self) -> ChunkBuffers {
        std::mem::take(&mut self.buffers)
    }

    /// Installs freshly generated buffers, dropping an alpha stream that ended
    /// up empty.
    pub(crate) fn install_buffers(&mut self, mut buffers: ChunkBuffers) {
        buffers.release_unused_alpha();
        self.buffers = buffers;
        self.dirty = false;
    }
}

/// Tile range of the window `[origin, origin + dims)` overlapped by `query`,
/// clamped into the window. Touching faces do not count as overlap.
pub(crate) fn overlap_range(
    bounds: &Aabb,
    origin: TileCoord,
    dims: ChunkDims,
    query: &Aabb,
) -> Option<TileRange> {
    if dims.is_degenerate() || !bounds.intersects(query) {
        return None;
    }
    let hi = origin.offset(dims.x as i32 - 1, dims.y as i32 - 1, dims.z as i32 - 1);
    let mut min = origin;
    let mut max = hi;
    for axis in 0..3 {
        let lo_c = (query.min.axis(axis).floor() as i32).clamp(origin.axis(axis), hi.axis(axis));
        let hi_c = (query.max.axis(axis).ceil() as i32 - 1).clamp(origin.axis(axis), hi.axis(axis));
        *min.axis_mut(axis) = lo_c;
        *max.axis_mut(axis) = hi_c.max(lo_c);
    }
    Some(TileRange { min, max })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (Aabb, TileCoord, ChunkDims) {
        let origin = TileCoord::new(4, 0, 4);
        let dims = ChunkDims::new(4, 2, 4);
        let bounds = Aabb::new(origin.to_vec3(), Vec3::new(8.0, 2.0, 8.0));
        (bounds, origin, dims)
    }

    #[test]
    fn overlap_is_clamped_to_window() {
        let (bounds, origin, dims) = window();
        let q = Aabb::new(Vec3::new(2.5, -1.0, 5.2), Vec3::new(5.5, 0.5, 5.8));
        let r = overlap_range(&bounds, origin, dims, &q).unwrap();
        assert_eq!(r.min, TileCoord::new(4, 0, 5));
        assert_eq!(r.max, TileCoord::new(5, 0, 5));
    }

    #[test]
    fn touching_box_does_not_overlap() {
        let (bounds, origin, dims) = window();
        let q = Aabb::new(Vec3::new(8.0, 0.0, 4.0), Vec3::new(9.0, 1.0, 5.0));
        assert!(overlap_range(&bounds, origin, dims, &q).is_none());
    }

    #[test]
    fn integer_aligned_box_covers_exact_cells() {
        let (bounds, origin, dims) = window();
        let q = Aabb::new(Vec3::new(5.0, 0.0, 5.0), Vec3::new(7.0, 1.0, 6.0));
        let r = overlap_range(&bounds, origin, dims, &q).unwrap();
        assert_eq!(r.min, TileCoord::new(5, 0, 5));
        assert_eq!(r.max, TileCoord::new(6, 0, 5));
        assert_eq!(r.len(), 2);
    }
}
