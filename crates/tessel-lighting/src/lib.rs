//! Map-wide light propagation: sky exposure plus flood-filled point light.
#![forbid(unsafe_code)]

use std::sync::Arc;

use tessel_map::{LightPropagator, TileMap};

mod flood;
mod sky;

pub use flood::{attenuate, propagate};
pub use sky::{reset, sky_pass};

/// Reset, sky pass, then 6-connected flood fill of both channels.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloodFillLighting;

impl LightPropagator for FloodFillLighting {
    fn propagate(&self, map: &mut TileMap) {
        let reg = Arc::clone(map.registry());
        reset(map);
        let sky_lit = sky_pass(map, &reg);
        let steps = flood::propagate(map, &reg);
        log::debug!(target: "perf", "flood lighting sky_lit={} spread_steps={}", sky_lit, steps);
    }
}

/// Reset and sky pass only; point lights are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkyOnlyLighting;

impl LightPropagator for SkyOnlyLighting {
    fn propagate(&self, map: &mut TileMap) {
        let reg = Arc::clone(map.registry());
        reset(map);
        let sky_lit = sky_pass(map, &reg);
        log::debug!(target: "perf", "sky lighting sky_lit={}", sky_lit);
    }
}
