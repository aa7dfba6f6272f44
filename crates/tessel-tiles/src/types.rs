use serde::Deserialize;
use tessel_geom::{QuarterTurn, Vec3};

use crate::mesh::TileMeshDefinition;
use crate::registry::TileMeshRegistry;

/// Upper bound of both light channels.
pub const LIGHT_MAX: u8 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshIndex(pub u16);

impl MeshIndex {
    /// Reserved index meaning "no tile".
    pub const EMPTY: MeshIndex = MeshIndex(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Authored and computed per-tile bits. Facing and custom color live in
/// dedicated fields on [`Tile`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileFlags(u8);

impl TileFlags {
    pub const NONE: TileFlags = TileFlags(0);
    pub const COLLIDABLE: TileFlags = TileFlags(1 << 0);
    pub const SLIPPERY: TileFlags = TileFlags(1 << 1);
    /// Computed by lighting; never authored.
    pub const SKY_LIT: TileFlags = TileFlags(1 << 2);
    pub const WALKABLE: TileFlags = TileFlags(1 << 3);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    #[inline]
    pub const fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: TileFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: TileFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn set(&mut self, other: TileFlags, on: bool) {
        if on { self.insert(other) } else { self.remove(other) }
    }
}

impl core::ops::BitOr for TileFlags {
    type Output = TileFlags;
    #[inline]
    fn bitor(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 | rhs.0)
    }
}

/// Horizontal orientation of a tile's mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    #[inline]
    pub fn rotation(self) -> QuarterTurn {
        match self {
            Facing::North => QuarterTurn::new(0),
            Facing::East => QuarterTurn::new(1),
            Facing::South => QuarterTurn::new(2),
            Facing::West => QuarterTurn::new(3),
        }
    }
}

/// The six faces of a cell. Index order is `+Y, -Y, +X, -X, +Z, -Z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top = 0,
    Bottom = 1,
    Right = 2,
    Left = 3,
    Front = 4,
    Back = 5,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::Right,
        Side::Left,
        Side::Front,
        Side::Back,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Right => Side::Left,
            Side::Left => Side::Right,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    /// Integer grid step when leaving the cell through this side.
    #[inline]
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Side::Top => (0, 1, 0),
            Side::Bottom => (0, -1, 0),
            Side::Right => (1, 0, 0),
            Side::Left => (-1, 0, 0),
            Side::Front => (0, 0, 1),
            Side::Back => (0, 0, -1),
        }
    }

    #[inline]
    pub fn from_offset(offset: (i32, i32, i32)) -> Option<Side> {
        match offset {
            (0, 1, 0) => Some(Side::Top),
            (0, -1, 0) => Some(Side::Bottom),
            (1, 0, 0) => Some(Side::Right),
            (-1, 0, 0) => Some(Side::Left),
            (0, 0, 1) => Some(Side::Front),
            (0, 0, -1) => Some(Side::Back),
            _ => None,
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.offset();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    #[inline]
    pub fn rotated(self, turn: QuarterTurn) -> Side {
        match Side::from_offset(turn.apply_offset(self.offset())) {
            Some(side) => side,
            None => unreachable!("quarter turns map unit offsets onto unit offsets"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SideMask(u8);

impl SideMask {
    pub const NONE: SideMask = SideMask(0);
    pub const ALL: SideMask = SideMask(0b11_1111);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, side: Side) -> bool {
        self.0 & (1 << side.index()) != 0
    }

    #[inline]
    pub fn with(self, side: Side) -> SideMask {
        SideMask(self.0 | (1 << side.index()))
    }

    #[inline]
    pub fn without(self, side: Side) -> SideMask {
        SideMask(self.0 & !(1 << side.index()))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Side> for SideMask {
    fn from_iter<I: IntoIterator<Item = Side>>(iter: I) -> Self {
        iter.into_iter().fold(SideMask::NONE, SideMask::with)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightChannel {
    Sky,
    Tile,
}

/// Per-cell state, stored inline in chunk arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    pub mesh: MeshIndex,
    pub flags: TileFlags,
    pub facing: Option<Facing>,
    pub sky_light: u8,
    pub tile_light: u8,
    pub color: Option<Rgba>,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        mesh: MeshIndex::EMPTY,
        flags: TileFlags::NONE,
        facing: None,
        sky_light: 0,
        tile_light: 0,
        color: None,
    };

    #[inline]
    pub fn new(mesh: MeshIndex) -> Self {
        Self { mesh, ..Self::EMPTY }
    }

    /// Non-empty and collidable.
    #[inline]
    pub fn solid(mesh: MeshIndex) -> Self {
        Self::new(mesh).with_flags(TileFlags::COLLIDABLE)
    }

    #[inline]
    pub fn with_flags(mut self, flags: TileFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    #[inline]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    #[inline]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    #[inline]
    pub fn is_empty_space(&self) -> bool {
        self.mesh.is_empty()
    }

    #[inline]
    pub fn is_collidable(&self) -> bool {
        !self.is_empty_space() && self.flags.contains(TileFlags::COLLIDABLE)
    }

    #[inline]
    pub fn is_sky_lit(&self) -> bool {
        self.flags.contains(TileFlags::SKY_LIT)
    }

    #[inline]
    pub fn has_custom_color(&self) -> bool {
        self.color.is_some()
    }

    #[inline]
    pub fn rotation(&self) -> QuarterTurn {
        self.facing.map_or(QuarterTurn::IDENTITY, Facing::rotation)
    }

    #[inline]
    pub fn light(&self, channel: LightChannel) -> u8 {
        match channel {
            LightChannel::Sky => self.sky_light,
            LightChannel::Tile => self.tile_light,
        }
    }

    #[inline]
    pub fn set_light(&mut self, channel: LightChannel, value: u8) {
        let value = value.min(LIGHT_MAX);
        match channel {
            LightChannel::Sky => self.sky_light = value,
            LightChannel::Tile => self.tile_light = value,
        }
    }

    #[inline]
    pub fn combined_light(&self) -> u8 {
        self.sky_light.max(self.tile_light)
    }

    /// Mesh definition for this tile; `None` for empty space or an unset slot.
    #[inline]
    pub fn mesh_def<'r>(&self, reg: &'r TileMeshRegistry) -> Option<&'r TileMeshDefinition> {
        if self.is_empty_space() {
            return None;
        }
        reg.get(self.mesh)
    }

    /// Whether the tile's mesh blocks the given world-space side, after
    /// undoing the tile's facing rotation.
    #[inline]
    pub fn is_opaque_toward(&self, reg: &TileMeshRegistry, world_side: Side) -> bool {
        match self.mesh_def(reg) {
            Some(def) => {
                let local = world_side.rotated(self.rotation().inverse());
                def.opaque_sides().contains(local)
            }
            None => false,
        }
    }

    /// Light attenuation factor; empty space passes everything.
    #[inline]
    pub fn translucency(&self, reg: &TileMeshRegistry) -> f32 {
        self.mesh_def(reg).map_or(1.0, TileMeshDefinition::translucency)
    }

    #[inline]
    pub fn base_color(&self, reg: &TileMeshRegistry) -> Rgba {
        self.color
            .or_else(|| self.mesh_def(reg).map(TileMeshDefinition::color))
            .unwrap_or(Rgba::WHITE)
    }
}
