use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tessel::geom::{Ray, Vec3};
use tessel::map::{ChunkDims, NullDevice, RecordingDevice, SharedDevice, TileCoord, TileMap};
use tessel::tiles::{LightChannel, Side, Tile, TileMeshRegistry};
use tessel::{HeightField, LightingMode, MapSettings, MeshingMode, TerrainPalette};

fn settings(lighting: LightingMode, meshing: MeshingMode) -> MapSettings {
    let mut s = MapSettings::from_toml_str(
        r#"
        chunks = [2, 1, 2]
        chunk_dims = [4, 8, 4]
        [terrain]
        lamp_spacing = 4
        "#,
    )
    .unwrap();
    s.lighting = lighting;
    s.meshing = meshing;
    s
}

fn registry() -> Arc<TileMeshRegistry> {
    Arc::new(tessel::default_registry().unwrap())
}

fn null_device() -> SharedDevice {
    Rc::new(RefCell::new(NullDevice::default()))
}

fn terrain_map(s: &MapSettings, seed: i32) -> (TileMap, TerrainPalette) {
    let reg = registry();
    let palette = TerrainPalette::from_registry(&reg).unwrap();
    let mut map = tessel::build_map(s, reg, null_device());
    tessel::fill_height_terrain(&mut map, &s.terrain, seed, &palette);
    (map, palette)
}

fn is_lamp_column(x: i32, z: i32) -> bool {
    x % 4 == 2 && z % 4 == 2
}

#[test]
fn default_registry_has_the_demo_tiles() {
    let reg = tessel::default_registry().unwrap();
    assert_eq!(reg.len(), 4);
    let glass = reg.get(reg.index_of("glass").unwrap()).unwrap();
    assert!(glass.is_alpha());
    let lamp = reg.get(reg.index_of("lamp").unwrap()).unwrap();
    assert_eq!(lamp.emission(), 14);
}

#[test]
fn build_map_sizes_grid_from_settings() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let map = tessel::build_map(&s, registry(), null_device());
    assert_eq!(map.size(), ChunkDims::new(8, 8, 8));
    assert_eq!(map.chunks().len(), 4);
    assert!(map.chunks().iter().all(|c| c.is_dirty()));
    assert!(map.mesher().depends_on_light());
}

#[test]
fn unlit_meshing_does_not_depend_on_light() {
    let s = settings(LightingMode::Sky, MeshingMode::Unlit);
    let map = tessel::build_map(&s, registry(), null_device());
    assert!(!map.mesher().depends_on_light());
}

#[test]
fn missing_palette_tile_is_reported() {
    let reg = TileMeshRegistry::from_toml_str("[[tiles]]\nname = \"stone\"\n").unwrap();
    let err = TerrainPalette::from_registry(&reg).unwrap_err();
    assert!(matches!(err, tessel::Error::MissingTile(name) if name == "grass"));
}

#[test]
fn terrain_is_deterministic_per_seed() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let (a, _) = terrain_map(&s, 7);
    let (b, _) = terrain_map(&s, 7);
    assert!(a.tiles().zip(b.tiles()).all(|((ca, ta), (cb, tb))| ca == cb && ta == tb));
}

#[test]
fn terrain_columns_follow_the_height_field() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let (map, palette) = terrain_map(&s, 11);
    let field = HeightField::new(11, &s.terrain);
    let size = map.size();
    for z in 0..size.z as i32 {
        for x in 0..size.x as i32 {
            let h = field.height(x, z, size.y) as i32;
            assert!(h >= 1 && h <= (size.y as f32 * s.terrain.max_y_ratio) as i32);
            assert_eq!(map.tile(TileCoord::new(x, h - 1, z)).mesh, palette.surface);
            if h >= 2 {
                assert_eq!(map.tile(TileCoord::new(x, 0, z)).mesh, palette.subsurface);
            }
            let above = map.tile(TileCoord::new(x, h, z));
            if is_lamp_column(x, z) {
                assert_eq!(Some(above.mesh), palette.lamp);
            } else {
                assert!(above.is_empty_space());
            }
        }
    }
}

#[test]
fn downward_rays_land_on_the_surface() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let (map, _) = terrain_map(&s, 3);
    let field = HeightField::new(3, &s.terrain);
    let size = map.size();
    for z in 0..size.z as i32 {
        for x in 0..size.x as i32 {
            let ray = Ray::new(Vec3::new(x as f32 + 0.5, 20.0, z as f32 + 0.5), Vec3::new(0.0, -1.0, 0.0));
            let hit = map.check_for_collision(&ray).unwrap();
            let h = field.height(x, z, size.y) as i32;
            let expect = if is_lamp_column(x, z) { h } else { h - 1 };
            assert_eq!(hit.coord, TileCoord::new(x, expect, z));
            assert_eq!(hit.entered_through, Some(Side::Top));
            assert_eq!(hit.normal(), (0, 1, 0));
        }
    }
}

#[test]
fn full_rebuild_lights_and_meshes_every_chunk() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let reg = registry();
    let palette = TerrainPalette::from_registry(&reg).unwrap();
    let recorder = Rc::new(RefCell::new(RecordingDevice::default()));
    let device: SharedDevice = recorder.clone();
    let mut map = tessel::build_map(&s, reg, device);
    let stats = tessel::fill_height_terrain(&mut map, &s.terrain, 5, &palette);
    assert_eq!(stats.lamps, 4);

    let report = map.rebuild_dirty();
    assert!(report.relit);
    assert_eq!(report.chunks_rebuilt, 4);
    assert!(report.stats.opaque_vertices > 0);
    assert_eq!(report.stats.alpha_vertices, 0);
    assert!(map.chunks().iter().all(|c| !c.is_dirty()));
    assert_eq!(recorder.borrow().live_buffers(), 4);

    let field = HeightField::new(5, &s.terrain);
    let h = field.height(2, 2, 8) as i32;
    assert_eq!(map.tile(TileCoord::new(2, h, 2)).light(LightChannel::Tile), 14);
    assert_eq!(map.tile(TileCoord::new(2, h + 1, 2)).light(LightChannel::Tile), 13);
    assert_eq!(map.tile(TileCoord::new(0, 7, 0)).light(LightChannel::Sky), 15);

    let again = map.rebuild_dirty();
    assert!(!again.relit);
    assert_eq!(again.chunks_rebuilt, 0);
}

#[test]
fn sky_only_lighting_ignores_lamps() {
    let s = settings(LightingMode::Sky, MeshingMode::Unlit);
    let (mut map, _) = terrain_map(&s, 5);
    map.rebuild_dirty();
    let field = HeightField::new(5, &s.terrain);
    let h = field.height(2, 2, 8) as i32;
    assert_eq!(map.tile(TileCoord::new(2, h + 1, 2)).light(LightChannel::Tile), 0);
}

#[test]
fn unlit_edit_rebuilds_only_touched_chunks() {
    let s = settings(LightingMode::Flood, MeshingMode::Unlit);
    let (mut map, palette) = terrain_map(&s, 9);
    map.rebuild_dirty();

    // interior of chunk (0,0,0), away from every chunk face
    map.set_tile(TileCoord::new(1, 7, 1), Tile::solid(palette.subsurface));
    let report = map.rebuild_dirty();
    assert!(report.relit);
    assert_eq!(report.chunks_rebuilt, 1);
}

#[test]
fn lit_edit_rebuilds_every_chunk() {
    let s = settings(LightingMode::Flood, MeshingMode::Lit);
    let (mut map, palette) = terrain_map(&s, 9);
    map.rebuild_dirty();

    map.set_tile(TileCoord::new(1, 7, 1), Tile::solid(palette.subsurface));
    let report = map.rebuild_dirty();
    assert!(report.relit);
    assert_eq!(report.chunks_rebuilt, 4);
}
