use tessel_map::{TileCoord, TileMap};
use tessel_tiles::{LightChannel, Side, TileFlags, TileMeshRegistry};

use crate::flood::attenuate;

/// Clears sky exposure and sky light, and floors tile light at the map's
/// ambient value.
pub fn reset(map: &mut TileMap) {
    let ambient = map.light_settings().ambient;
    for (_, tile) in map.tiles_mut() {
        tile.flags.remove(TileFlags::SKY_LIT);
        tile.sky_light = 0;
        tile.set_light(LightChannel::Tile, ambient);
    }
}

/// Scans every column top-down, marking tiles sky-lit until the first tile
/// opaque on both its top and bottom. Returns the number of tiles marked.
pub fn sky_pass(map: &mut TileMap, reg: &TileMeshRegistry) -> usize {
    let sky = map.light_settings().sky;
    let size = map.size();
    let mut marked = 0;
    for z in 0..size.z as i32 {
        for x in 0..size.x as i32 {
            for y in (0..size.y as i32).rev() {
                let Some(tile) = map.get_mut(TileCoord::new(x, y, z)) else {
                    break;
                };
                if tile.is_opaque_toward(reg, Side::Top) && tile.is_opaque_toward(reg, Side::Bottom) {
                    break;
                }
                let level = if tile.is_empty_space() {
                    sky
                } else {
                    attenuate(sky, tile.translucency(reg))
                };
                tile.flags.insert(TileFlags::SKY_LIT);
                tile.set_light(LightChannel::Sky, level);
                marked += 1;
            }
        }
    }
    marked
}
