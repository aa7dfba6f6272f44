use core::ops::Add;

use tessel_geom::Vec3;
use tessel_tiles::Side;

/// Global tile coordinate. A tile occupies `[x, x+1) x [y, y+1) x [z, z+1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn step(self, side: Side) -> Self {
        let (dx, dy, dz) = side.offset();
        self.offset(dx, dy, dz)
    }

    /// Minimum corner in map space.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    #[inline]
    pub fn axis(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("axis index {axis} out of range"),
        }
    }

    #[inline]
    pub fn axis_mut(&mut self, axis: usize) -> &mut i32 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("axis index {axis} out of range"),
        }
    }
}

impl Add for TileCoord {
    type Output = TileCoord;
    #[inline]
    fn add(self, rhs: TileCoord) -> TileCoord {
        TileCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl From<(i32, i32, i32)> for TileCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<TileCoord> for (i32, i32, i32) {
    fn from(value: TileCoord) -> Self {
        (value.x, value.y, value.z)
    }
}

/// Position of a chunk within the map's chunk grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: usize,
    pub cy: usize,
    pub cz: usize,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: usize, cy: usize, cz: usize) -> Self {
        Self { cx, cy, cz }
    }
}

/// Extent along each axis, in tiles (chunk size) or chunks (grid size).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkDims {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl ChunkDims {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn volume(self) -> usize {
        self.x * self.y * self.z
    }

    #[inline]
    pub const fn is_degenerate(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Linear index, x fastest then z then y.
    #[inline]
    pub const fn linear(self, x: usize, y: usize, z: usize) -> usize {
        (y * self.z + z) * self.x + x
    }

    #[inline]
    pub const fn delinear(self, i: usize) -> (usize, usize, usize) {
        let x = i % self.x;
        let z = (i / self.x) % self.z;
        let y = i / (self.x * self.z);
        (x, y, z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkIndex(pub usize);

/// Inclusive tile range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRange {
    pub min: TileCoord,
    pub max: TileCoord,
}

impl TileRange {
    #[inline]
    pub fn contains(&self, c: TileCoord) -> bool {
        c.x >= self.min.x
            && c.x <= self.max.x
            && c.y >= self.min.y
            && c.y <= self.max.y
            && c.z >= self.min.z
            && c.z <= self.max.z
    }

    #[inline]
    pub fn len(&self) -> usize {
        let span = |lo: i32, hi: i32| (hi - lo + 1).max(0) as usize;
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y) * span(self.min.z, self.max.z)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| TileCoord::new(x, y, z)))
        })
    }
}

/// Inclusive range of chunk grid positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl ChunkRange {
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.cy..=max.cy).flat_map(move |cy| {
            (min.cz..=max.cz)
                .flat_map(move |cz| (min.cx..=max.cx).map(move |cx| ChunkCoord::new(cx, cy, cz)))
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.max.cx - self.min.cx + 1) * (self.max.cy - self.min.cy + 1) * (self.max.cz - self.min.cz + 1)
    }

    /// Inclusive ranges built by the map always hold at least one chunk.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
