use tessel_tiles::{LIGHT_MAX, Rgba};

/// Visual-only floor so unlit faces are not pitch black. Does not affect
/// light propagation.
pub const LIT_FLOOR: u8 = 1;

/// Per-vertex color policy of a mesher.
pub trait TileShading {
    /// Whether [`TileShading::shade`] reads the light level.
    const USES_LIGHT: bool;

    fn shade(&self, base: Rgba, light: u8) -> [u8; 4];
}

/// Base color as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlit;

impl TileShading for Unlit {
    const USES_LIGHT: bool = false;

    #[inline]
    fn shade(&self, base: Rgba, _light: u8) -> [u8; 4] {
        base.to_array()
    }
}

/// Scales RGB by `max(light, LIT_FLOOR) / LIGHT_MAX`; alpha is untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightShading;

impl TileShading for LightShading {
    const USES_LIGHT: bool = true;

    #[inline]
    fn shade(&self, base: Rgba, light: u8) -> [u8; 4] {
        let level = light.clamp(LIT_FLOOR, LIGHT_MAX) as u32;
        let scale = |c: u8| ((c as u32 * level) / LIGHT_MAX as u32) as u8;
        [scale(base.r), scale(base.g), scale(base.b), base.a]
    }
}
