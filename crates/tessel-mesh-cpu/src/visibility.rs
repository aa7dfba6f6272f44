use std::time::Instant;

use tessel_geom::QuarterTurn;
use tessel_map::{ChunkBuffers, ChunkIndex, ChunkMesher, MeshStats, TileChunk, TileCoord, TileMap};
use tessel_tiles::{MeshShape, Side, Tile, TileVertex};

use crate::emit::emit_batch;
use crate::shading::{LightShading, TileShading, Unlit};

/// Emits only the geometry of each tile that can be seen: cube faces whose
/// neighbour across the face is missing or open on the facing side, and whole
/// arbitrary meshes with at least one open neighbour.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityMesher<S = Unlit> {
    shading: S,
}

/// Bakes tile light into vertex colors.
pub type LitVisibilityMesher = VisibilityMesher<LightShading>;

impl VisibilityMesher<Unlit> {
    #[inline]
    pub fn new() -> Self {
        Self { shading: Unlit }
    }
}

impl VisibilityMesher<LightShading> {
    #[inline]
    pub fn lit() -> Self {
        Self {
            shading: LightShading,
        }
    }
}

// One visible piece of one tile, resolved before anything is written so each
// stream can grow exactly once.
struct Batch<'a> {
    vertices: &'a [TileVertex],
    rot: QuarterTurn,
    coord: TileCoord,
    color: [u8; 4],
    alpha: bool,
}

impl<S: TileShading> VisibilityMesher<S> {
    #[inline]
    pub fn with_shading(shading: S) -> Self {
        Self { shading }
    }

    fn plan_tile<'a>(
        &self,
        map: &'a TileMap,
        chunk: &'a TileChunk,
        local: (usize, usize, usize),
        batches: &mut Vec<Batch<'a>>,
        stats: &mut MeshStats,
    ) {
        let reg = map.registry().as_ref();
        let tile = chunk.tile_local(local.0, local.1, local.2);
        let Some(def) = tile.mesh_def(reg) else {
            return;
        };
        let rot = tile.rotation();
        let coord = chunk.to_global(local.0, local.1, local.2);
        let base = tile.base_color(reg);
        let alpha = def.is_alpha();
        let neighbour = |world: Side| chunk.get_within_self_or_neighbour_safe(map, local, world.offset());
        let hides = |n: Option<&Tile>, world: Side| n.is_some_and(|n| n.is_opaque_toward(reg, world.opposite()));

        match def.shape() {
            MeshShape::Cube(faces) => {
                for side in Side::ALL {
                    let Some(vertices) = faces.face(side) else {
                        continue;
                    };
                    let world = side.rotated(rot);
                    let n = neighbour(world);
                    if hides(n, world) {
                        stats.faces_culled += 1;
                        continue;
                    }
                    let light = if S::USES_LIGHT {
                        tile.combined_light().max(n.map_or(0, Tile::combined_light))
                    } else {
                        0
                    };
                    batches.push(Batch {
                        vertices,
                        rot,
                        coord,
                        color: self.shading.shade(base, light),
                        alpha,
                    });
                }
            }
            MeshShape::Arbitrary(vertices) => {
                let mut open = false;
                let mut light = tile.combined_light();
                for world in Side::ALL {
                    let n = neighbour(world);
                    if hides(n, world) {
                        continue;
                    }
                    open = true;
                    light = light.max(n.map_or(0, Tile::combined_light));
                }
                if !open {
                    stats.faces_culled += 1;
                    return;
                }
                batches.push(Batch {
                    vertices,
                    rot,
                    coord,
                    color: self.shading.shade(base, if S::USES_LIGHT { light } else { 0 }),
                    alpha,
                });
            }
        }
    }
}

impl<S: TileShading> ChunkMesher for VisibilityMesher<S> {
    fn generate(&self, map: &TileMap, index: ChunkIndex, out: &mut ChunkBuffers) -> MeshStats {
        let start = Instant::now();
        let chunk = map.chunk(index);
        let dims = chunk.dims();
        let mut stats = MeshStats::default();
        let mut batches = Vec::new();
        for y in 0..dims.y {
            for z in 0..dims.z {
                for x in 0..dims.x {
                    self.plan_tile(map, chunk, (x, y, z), &mut batches, &mut stats);
                }
            }
        }

        let (opaque, alpha) = batches.iter().fold((0, 0), |(o, a), b| {
            if b.alpha {
                (o, a + b.vertices.len())
            } else {
                (o + b.vertices.len(), a)
            }
        });
        out.opaque_mut().reserve_exact_for(opaque);
        if alpha > 0 {
            out.enable_alpha().reserve_exact_for(alpha);
        }
        for b in &batches {
            let n = emit_batch(out.stream_mut(b.alpha), b.vertices, b.rot, b.coord, b.color);
            if b.alpha {
                stats.alpha_vertices += n;
            } else {
                stats.opaque_vertices += n;
            }
        }
        out.release_unused_alpha();

        log::debug!(
            target: "perf",
            "ms={:.2} mesh_visibility chunk={} opaque={} alpha={} culled={}",
            start.elapsed().as_secs_f64() * 1000.0,
            index.0,
            stats.opaque_vertices,
            stats.alpha_vertices,
            stats.faces_culled
        );
        stats
    }

    fn depends_on_light(&self) -> bool {
        S::USES_LIGHT
    }
}
