use fastnoise_lite::{FastNoiseLite, NoiseType};
use tessel_map::{TileCoord, TileMap};
use tessel_tiles::{MeshIndex, Tile, TileMeshRegistry};

use crate::config::{Error, Terrain};

/// Which registry entries the terrain fill writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainPalette {
    pub surface: MeshIndex,
    pub subsurface: MeshIndex,
    pub lamp: Option<MeshIndex>,
}

impl TerrainPalette {
    /// Looks up `grass`, `stone`, and the optional `lamp` by name.
    pub fn from_registry(reg: &TileMeshRegistry) -> Result<Self, Error> {
        let find = |name: &str| reg.index_of(name).ok_or_else(|| Error::MissingTile(name.to_owned()));
        Ok(Self {
            surface: find("grass")?,
            subsurface: find("stone")?,
            lamp: reg.index_of("lamp"),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    pub solid_tiles: usize,
    pub lamps: usize,
}

/// Column heights for one seed; heights are in tiles and never below one.
pub struct HeightField {
    noise: FastNoiseLite,
    min_y_ratio: f32,
    max_y_ratio: f32,
}

impl HeightField {
    pub fn new(seed: i32, terrain: &Terrain) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(terrain.frequency));
        Self {
            noise,
            min_y_ratio: terrain.min_y_ratio,
            max_y_ratio: terrain.max_y_ratio,
        }
    }

    pub fn height(&self, x: i32, z: i32, size_y: usize) -> usize {
        let n = ((self.noise.get_noise_2d(x as f32, z as f32) + 1.0) * 0.5).clamp(0.0, 1.0);
        let ratio = self.min_y_ratio + (self.max_y_ratio - self.min_y_ratio) * n;
        ((ratio * size_y as f32) as usize).clamp(1, size_y)
    }
}

/// Replaces the map contents with a noise height field and a lattice of
/// lamps resting on the surface.
pub fn fill_height_terrain(map: &mut TileMap, terrain: &Terrain, seed: i32, palette: &TerrainPalette) -> TerrainStats {
    let field = HeightField::new(seed, terrain);
    let size = map.size();
    let mut stats = TerrainStats::default();
    let spacing = terrain.lamp_spacing;
    for z in 0..size.z as i32 {
        for x in 0..size.x as i32 {
            let h = field.height(x, z, size.y);
            for y in 0..size.y {
                let c = TileCoord::new(x, y as i32, z);
                let tile = if y >= h {
                    Tile::EMPTY
                } else if y + terrain.topsoil_thickness >= h {
                    Tile::solid(palette.surface)
                } else {
                    Tile::solid(palette.subsurface)
                };
                if !tile.is_empty_space() {
                    stats.solid_tiles += 1;
                }
                map.set_tile(c, tile);
            }
            let on_lattice = spacing > 0 && x as usize % spacing == spacing / 2 && z as usize % spacing == spacing / 2;
            if let Some(lamp) = palette.lamp.filter(|_| on_lattice && h < size.y) {
                map.set_tile(TileCoord::new(x, h as i32, z), Tile::solid(lamp));
                stats.solid_tiles += 1;
                stats.lamps += 1;
            }
        }
    }
    log::info!(
        "terrain seed={} solid={} lamps={}",
        seed,
        stats.solid_tiles,
        stats.lamps
    );
    stats
}
