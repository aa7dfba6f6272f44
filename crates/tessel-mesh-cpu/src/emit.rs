use tessel_geom::{QuarterTurn, Vec3};
use tessel_map::{MapVertex, TileCoord, VertexBuffer};
use tessel_tiles::TileVertex;

/// Places origin-centred mesh vertices at a tile: rotate by facing, then
/// shift to the tile's minimum corner plus half a cell.
#[inline]
pub(crate) fn place(v: &TileVertex, rot: QuarterTurn, base: Vec3, color: [u8; 4]) -> MapVertex {
    MapVertex {
        position: (rot.apply(v.position) + base).to_array(),
        normal: rot.apply(v.normal).to_array(),
        uv: [v.uv.u, v.uv.v],
        color,
    }
}

/// Writes a batch into space the caller already reserved. Returns the count.
#[inline]
pub(crate) fn emit_batch<'a>(
    out: &mut VertexBuffer,
    vertices: impl IntoIterator<Item = &'a TileVertex>,
    rot: QuarterTurn,
    coord: TileCoord,
    color: [u8; 4],
) -> usize {
    let base = coord.to_vec3() + Vec3::HALF;
    let mut n = 0;
    for v in vertices {
        out.push(place(v, rot, base, color));
        n += 1;
    }
    n
}
