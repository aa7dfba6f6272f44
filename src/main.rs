use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tessel::geom::{Ray, Vec3};
use tessel::map::{RecordingDevice, SharedDevice, TileMap};
use tessel::tiles::{Side, TileMeshRegistry};
use tessel::{MapSettings, TerrainPalette};

#[derive(Parser, Debug)]
#[command(name = "tessel-demo", about = "Build, light, and mesh a noise terrain tile map")]
struct Args {
    /// Map settings TOML; built-in defaults when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Tile definitions TOML; a small built-in set when omitted.
    #[arg(long)]
    tiles: Option<PathBuf>,
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    /// Spacing between the downward sample rays, in tiles.
    #[arg(long, default_value_t = 4)]
    ray_step: usize,
}

fn main() -> Result<(), tessel::Error> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(p) => MapSettings::load_from_path(p)?,
        None => MapSettings::default(),
    };
    let registry = match &args.tiles {
        Some(p) => TileMeshRegistry::load_from_path(p)?,
        None => tessel::default_registry()?,
    };
    let palette = TerrainPalette::from_registry(&registry)?;

    let recorder = Rc::new(RefCell::new(RecordingDevice::default()));
    let device: SharedDevice = recorder.clone();
    let mut map = tessel::build_map(&settings, Arc::new(registry), device);
    tessel::fill_height_terrain(&mut map, &settings.terrain, args.seed, &palette);

    let start = Instant::now();
    let report = map.rebuild_dirty();
    log::info!(
        "rebuilt {} chunks in {:.2}ms relit={} opaque={} alpha={} culled={}",
        report.chunks_rebuilt,
        start.elapsed().as_secs_f64() * 1000.0,
        report.relit,
        report.stats.opaque_vertices,
        report.stats.alpha_vertices,
        report.stats.faces_culled
    );

    sample_surface(&map, args.ray_step.max(1));

    let dev = recorder.borrow();
    log::info!(
        "device live_buffers={} uploads={} bytes={}",
        dev.live_buffers(),
        dev.uploads,
        dev.bytes_uploaded
    );
    Ok(())
}

// Drops a ray into every sampled column and reports where the surface sits.
fn sample_surface(map: &TileMap, step: usize) {
    let size = map.size();
    let top = size.y as f32 + 1.0;
    let (mut hits, mut misses, mut height_sum) = (0usize, 0usize, 0usize);
    for z in (0..size.z).step_by(step) {
        for x in (0..size.x).step_by(step) {
            let origin = Vec3::new(x as f32 + 0.5, top, z as f32 + 0.5);
            let ray = Ray::new(origin, Vec3::new(0.0, -1.0, 0.0));
            match map.check_for_collision(&ray) {
                Some(hit) if hit.entered_through == Some(Side::Top) => {
                    hits += 1;
                    height_sum += hit.coord.y as usize + 1;
                }
                Some(hit) => log::warn!("ray at ({x}, {z}) entered {:?} through {:?}", hit.coord, hit.entered_through),
                None => misses += 1,
            }
        }
    }
    let mean = if hits > 0 { height_sum as f32 / hits as f32 } else { 0.0 };
    log::info!("surface rays hits={} misses={} mean_surface={:.2}", hits, misses, mean);
}
