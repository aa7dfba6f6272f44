use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use tessel_lighting::FloodFillLighting;
use tessel_map::{ChunkDims, ChunkIndex, LightSettings, NullDevice, SharedDevice, Strategies, TileCoord, TileMap};
use tessel_mesh_cpu::{LitVisibilityMesher, VisibilityMesher};
use tessel_tiles::{CubeStyle, MeshProperties, Tile, TileMeshDefinition, TileMeshRegistry};

fn registry() -> Arc<TileMeshRegistry> {
    let mut reg = TileMeshRegistry::new();
    reg.insert("stone", TileMeshDefinition::cube(CubeStyle::default(), MeshProperties::default()));
    reg.insert(
        "glass",
        TileMeshDefinition::cube(
            CubeStyle::default(),
            MeshProperties { alpha: true, translucency: 0.8, ..Default::default() },
        ),
    );
    Arc::new(reg)
}

// Rolling terrain with scattered glass, in a single 32x32x32 chunk.
fn terrain(strategies: Strategies) -> TileMap {
    let reg = registry();
    let stone = reg.index_of("stone").unwrap();
    let glass = reg.index_of("glass").unwrap();
    let device: SharedDevice = Rc::new(RefCell::new(NullDevice::default()));
    let mut map = TileMap::new(reg, device, strategies, LightSettings::default());
    map.resize(1, 1, 1, ChunkDims::new(32, 32, 32));
    for z in 0..32 {
        for x in 0..32 {
            let h = 8 + ((x * 7 + z * 13) % 11) + ((x ^ z) % 5);
            for y in 0..h {
                let mesh = if (x + y + z) % 17 == 0 { glass } else { stone };
                map.set_tile(TileCoord::new(x, y, z), Tile::solid(mesh));
            }
        }
    }
    map.recompute_lighting();
    map
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_mesh");
    let mut unlit = terrain(Strategies::new(VisibilityMesher::new(), FloodFillLighting));
    group.bench_function("unlit_32x32x32", |b| {
        b.iter(|| black_box(unlit.generate_vertices(ChunkIndex(0))))
    });
    let mut lit = terrain(Strategies::new(LitVisibilityMesher::lit(), FloodFillLighting));
    group.bench_function("lit_32x32x32", |b| {
        b.iter(|| black_box(lit.generate_vertices(ChunkIndex(0))))
    });
    group.finish();
}

fn bench_flood_lighting(c: &mut Criterion) {
    let mut group = c.benchmark_group("flood_lighting");
    let mut map = terrain(Strategies::new(VisibilityMesher::new(), FloodFillLighting));
    group.bench_function("terrain_32x32x32", |b| b.iter(|| map.recompute_lighting()));
    group.finish();
}

criterion_group!(benches, bench_visibility, bench_flood_lighting);
criterion_main!(benches);
