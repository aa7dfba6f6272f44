use tessel_map::{TileCoord, TileMap};
use tessel_tiles::{LIGHT_MAX, LightChannel, Side, TileMeshRegistry};

/// Light surviving a pass through a tile of the given translucency, rounded
/// to the nearest unit.
#[inline]
pub fn attenuate(level: u8, translucency: f32) -> u8 {
    (level as f32 * translucency).round().clamp(0.0, LIGHT_MAX as f32) as u8
}

type Entry = (TileCoord, LightChannel, u8);

/// Spreads sky light from sky-lit tiles and tile light from emitters.
///
/// Values are written as entries are pushed, and each entry carries the value
/// it wrote; an entry whose tile has since been raised above it is skipped.
/// Every write strictly raises a bounded value, so the work list drains.
/// Returns the number of entries expanded.
pub fn propagate(map: &mut TileMap, reg: &TileMeshRegistry) -> usize {
    let mut work: Vec<Entry> = Vec::new();
    for (c, tile) in map.tiles_mut() {
        if tile.is_sky_lit() && tile.sky_light > 0 {
            work.push((c, LightChannel::Sky, tile.sky_light));
        }
        let emission = tile.mesh_def(reg).map_or(0, |d| d.emission().min(LIGHT_MAX));
        if emission > tile.tile_light {
            tile.tile_light = emission;
        }
        if emission > 0 {
            work.push((c, LightChannel::Tile, tile.tile_light));
        }
    }

    let mut expanded = 0;
    while let Some((c, channel, level)) = work.pop() {
        let Some(current) = map.get(c).map(|t| t.light(channel)) else {
            continue;
        };
        if current > level || level <= 1 {
            continue;
        }
        expanded += 1;
        let next = level - 1;
        for side in Side::ALL {
            let n = c.step(side);
            let Some(tile) = map.get_mut(n) else { continue };
            if tile.is_opaque_toward(reg, side.opposite()) {
                continue;
            }
            let v = if tile.is_empty_space() {
                next
            } else {
                attenuate(next, tile.translucency(reg))
            };
            if v > 0 && tile.light(channel) < v {
                tile.set_light(channel, v);
                work.push((n, channel, v));
            }
        }
    }
    expanded
}
