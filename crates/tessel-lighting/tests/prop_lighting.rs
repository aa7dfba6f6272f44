use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use proptest::prelude::*;
use tessel_lighting::{FloodFillLighting, attenuate};
use tessel_map::{
    ChunkBuffers, ChunkDims, ChunkIndex, ChunkMesher, LightSettings, MeshStats, NullDevice,
    SharedDevice, Strategies, TileCoord, TileMap,
};
use tessel_tiles::{
    CubeStyle, Facing, LIGHT_MAX, LightChannel, MeshProperties, Side, SideMask, Tile,
    TileMeshDefinition, TileMeshRegistry,
};

struct NoMesh;

impl ChunkMesher for NoMesh {
    fn generate(&self, _map: &TileMap, _chunk: ChunkIndex, _out: &mut ChunkBuffers) -> MeshStats {
        MeshStats::default()
    }
}

const KINDS: [&str; 5] = ["stone", "glass", "lamp", "lantern", "panel"];

fn registry() -> TileMeshRegistry {
    let cube = |props| TileMeshDefinition::cube(CubeStyle::default(), props);
    let mut reg = TileMeshRegistry::new();
    reg.insert("stone", cube(MeshProperties::default()));
    reg.insert(
        "glass",
        cube(MeshProperties { alpha: true, translucency: 0.6, ..Default::default() }),
    );
    reg.insert("lamp", cube(MeshProperties { emission: 9, ..Default::default() }));
    reg.insert(
        "lantern",
        cube(MeshProperties { alpha: true, translucency: 0.5, emission: 6, ..Default::default() }),
    );
    reg.insert(
        "panel",
        cube(MeshProperties {
            opaque_sides: Some(SideMask::NONE.with(Side::Back).with(Side::Top)),
            translucency: 0.8,
            ..Default::default()
        }),
    );
    reg
}

type Placement = ((i32, i32, i32), usize, Option<Facing>);

fn placements() -> impl Strategy<Value = Vec<Placement>> {
    let facing = prop_oneof![
        Just(None),
        Just(Some(Facing::North)),
        Just(Some(Facing::East)),
        Just(Some(Facing::South)),
        Just(Some(Facing::West)),
    ];
    prop::collection::vec(((0i32..4, 0i32..4, 0i32..4), 0usize..KINDS.len(), facing), 0..24)
}

fn lit_map(sky: u8, placed: &[Placement]) -> TileMap {
    let reg = registry();
    let ids: Vec<_> = KINDS.iter().map(|k| reg.index_of(k).unwrap()).collect();
    let device: SharedDevice = Rc::new(RefCell::new(NullDevice::default()));
    let mut map = TileMap::new(
        Arc::new(reg),
        device,
        Strategies::new(NoMesh, FloodFillLighting),
        LightSettings::new(0, sky),
    );
    map.resize(2, 1, 1, ChunkDims::new(2, 4, 4));
    for &((x, y, z), kind, facing) in placed {
        let mut t = Tile::solid(ids[kind]);
        t.facing = facing;
        map.set_tile(TileCoord::new(x, y, z), t);
    }
    map.recompute_lighting();
    map
}

// Best value any passable neighbour could hand to `c` on `channel`.
fn best_incoming(map: &TileMap, c: TileCoord, channel: LightChannel) -> u8 {
    let reg = map.registry();
    let tile = map.tile(c);
    let mut best = 0;
    for side in Side::ALL {
        let Some(n) = map.get(c.step(side)) else { continue };
        if tile.is_opaque_toward(reg, side) {
            continue;
        }
        let next = n.light(channel).saturating_sub(1);
        let v = if tile.is_empty_space() { next } else { attenuate(next, tile.translucency(reg)) };
        best = best.max(v);
    }
    best
}

proptest! {
    // nothing below a sky-blocking tile is sky-lit
    #[test]
    fn sky_lit_columns_stop_at_blockers(sky in 0u8..=LIGHT_MAX, placed in placements()) {
        let map = lit_map(sky, &placed);
        let reg = map.registry();
        let size = map.size();
        for (c, t) in map.tiles() {
            if !t.is_sky_lit() { continue; }
            for y in c.y + 1..size.y as i32 {
                let above = map.tile(TileCoord::new(c.x, y, c.z));
                prop_assert!(!(above.is_opaque_toward(reg, Side::Top) && above.is_opaque_toward(reg, Side::Bottom)));
            }
        }
    }

    // propagated values equal the best neighbour contribution; seeds never drop below it
    #[test]
    fn propagation_reaches_a_fixed_point(sky in 0u8..=LIGHT_MAX, placed in placements()) {
        let map = lit_map(sky, &placed);
        let reg = map.registry();
        for (c, t) in map.tiles() {
            prop_assert!(t.sky_light <= LIGHT_MAX && t.tile_light <= LIGHT_MAX);

            let incoming = best_incoming(&map, c, LightChannel::Sky);
            if t.is_sky_lit() {
                prop_assert!(t.sky_light >= incoming);
            } else {
                prop_assert_eq!(t.sky_light, incoming, "sky at {:?}", c);
            }

            let incoming = best_incoming(&map, c, LightChannel::Tile);
            let emission = t.mesh_def(reg).map_or(0, |d| d.emission());
            if emission > 0 {
                prop_assert!(t.tile_light >= incoming.max(emission));
            } else {
                prop_assert_eq!(t.tile_light, incoming, "tile light at {:?}", c);
            }
        }
    }
}
