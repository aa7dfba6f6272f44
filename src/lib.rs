//! Chunked tile maps with visibility meshing, ray collision, and flood-fill lighting.
#![forbid(unsafe_code)]

use std::rc::Rc;
use std::sync::Arc;

pub mod config;
pub mod terrain;

pub use config::{Error, LightingMode, MapSettings, MeshingMode, Terrain};
pub use terrain::{HeightField, TerrainPalette, TerrainStats, fill_height_terrain};

pub use tessel_geom as geom;
pub use tessel_lighting as lighting;
pub use tessel_map as map;
pub use tessel_mesh_cpu as mesh;
pub use tessel_tiles as tiles;

use tessel_lighting::{FloodFillLighting, SkyOnlyLighting};
use tessel_map::{ChunkMesher, LightPropagator, SharedDevice, Strategies, TileMap};
use tessel_mesh_cpu::{LitVisibilityMesher, VisibilityMesher};
use tessel_tiles::TileMeshRegistry;

/// Tile set used when no tile config is supplied.
pub const DEFAULT_TILES: &str = r#"
[[tiles]]
name = "stone"
color = [128, 128, 132, 255]

[[tiles]]
name = "grass"
color = [96, 168, 72, 255]

[[tiles]]
name = "glass"
alpha = true
translucency = 0.9
color = [200, 230, 255, 96]

[[tiles]]
name = "lamp"
color = [255, 220, 150, 255]
emission = 14
"#;

pub fn default_registry() -> Result<TileMeshRegistry, Error> {
    Ok(TileMeshRegistry::from_toml_str(DEFAULT_TILES)?)
}

/// The strategy pair named by the settings.
pub fn strategies_for(settings: &MapSettings) -> Strategies {
    let mesher: Rc<dyn ChunkMesher> = match settings.meshing {
        MeshingMode::Lit => Rc::new(LitVisibilityMesher::lit()),
        MeshingMode::Unlit => Rc::new(VisibilityMesher::new()),
    };
    let lighter: Rc<dyn LightPropagator> = match settings.lighting {
        LightingMode::Flood => Rc::new(FloodFillLighting),
        LightingMode::Sky => Rc::new(SkyOnlyLighting),
    };
    Strategies { mesher, lighter }
}

/// An empty map sized and configured from `settings`; every chunk starts dirty.
///
/// Panics if `settings` has a zero extent; [`MapSettings::validate`] rejects those.
pub fn build_map(settings: &MapSettings, registry: Arc<TileMeshRegistry>, device: SharedDevice) -> TileMap {
    let mut map = TileMap::new(registry, device, strategies_for(settings), settings.light_settings());
    let [cx, cy, cz] = settings.chunks;
    map.resize(cx, cy, cz, settings.dims());
    map
}
