//! Map settings read from TOML.
//!
//! ```toml
//! chunks = [4, 1, 4]
//! chunk_dims = [16, 32, 16]
//! ambient_light = 2
//! sky_light = 15
//! lighting = "flood"
//! meshing = "lit"
//!
//! [terrain]
//! frequency = 0.03
//! min_y_ratio = 0.2
//! max_y_ratio = 0.6
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessel_map::{ChunkDims, LightSettings};
use tessel_tiles::{LIGHT_MAX, TileConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Tiles(#[from] TileConfigError),
    #[error("`{field}` must be non-zero on every axis, got {value:?}")]
    ZeroExtent { field: &'static str, value: [usize; 3] },
    #[error("tile set has no `{0}` tile")]
    MissingTile(String),
    #[error("terrain ratios must satisfy 0 <= min_y_ratio <= max_y_ratio <= 1, got {min}..{max}")]
    TerrainRange { min: f32, max: f32 },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LightingMode {
    Flood,
    Sky,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MeshingMode {
    Lit,
    Unlit,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MapSettings {
    #[serde(default = "default_chunks")]
    pub chunks: [usize; 3],
    #[serde(default = "default_chunk_dims")]
    pub chunk_dims: [usize; 3],
    #[serde(default)]
    pub ambient_light: u8,
    #[serde(default = "default_sky_light")]
    pub sky_light: u8,
    #[serde(default = "default_lighting")]
    pub lighting: LightingMode,
    #[serde(default = "default_meshing")]
    pub meshing: MeshingMode,
    #[serde(default)]
    pub terrain: Terrain,
}

fn default_chunks() -> [usize; 3] {
    [4, 1, 4]
}
fn default_chunk_dims() -> [usize; 3] {
    [16, 32, 16]
}
fn default_sky_light() -> u8 {
    LIGHT_MAX
}
fn default_lighting() -> LightingMode {
    LightingMode::Flood
}
fn default_meshing() -> MeshingMode {
    MeshingMode::Lit
}

/// Height-field terrain shape used by [`crate::terrain::fill_height_terrain`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Terrain {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_min_y_ratio")]
    pub min_y_ratio: f32,
    #[serde(default = "default_max_y_ratio")]
    pub max_y_ratio: f32,
    #[serde(default = "default_topsoil")]
    pub topsoil_thickness: usize,
    /// One emitter is placed on the surface every `lamp_spacing` tiles along x and z; 0 disables.
    #[serde(default = "default_lamp_spacing")]
    pub lamp_spacing: usize,
}

fn default_height_freq() -> f32 {
    0.03
}
fn default_min_y_ratio() -> f32 {
    0.2
}
fn default_max_y_ratio() -> f32 {
    0.6
}
fn default_topsoil() -> usize {
    1
}
fn default_lamp_spacing() -> usize {
    12
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            min_y_ratio: default_min_y_ratio(),
            max_y_ratio: default_max_y_ratio(),
            topsoil_thickness: default_topsoil(),
            lamp_spacing: default_lamp_spacing(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            chunks: default_chunks(),
            chunk_dims: default_chunk_dims(),
            ambient_light: 0,
            sky_light: default_sky_light(),
            lighting: default_lighting(),
            meshing: default_meshing(),
            terrain: Terrain::default(),
        }
    }
}

impl MapSettings {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Error> {
        let settings: MapSettings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Rejects settings the map cannot be built from. Light values above
    /// `LIGHT_MAX` are accepted and clamped with a warning.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [("chunks", self.chunks), ("chunk_dims", self.chunk_dims)] {
            if value.contains(&0) {
                return Err(Error::ZeroExtent { field, value });
            }
        }
        let (min, max) = (self.terrain.min_y_ratio, self.terrain.max_y_ratio);
        if !(0.0 <= min && min <= max && max <= 1.0) {
            return Err(Error::TerrainRange { min, max });
        }
        for (name, v) in [("ambient_light", self.ambient_light), ("sky_light", self.sky_light)] {
            if v > LIGHT_MAX {
                log::warn!("{} {} clamped to {}", name, v, LIGHT_MAX);
            }
        }
        Ok(())
    }

    #[inline]
    pub fn light_settings(&self) -> LightSettings {
        LightSettings::new(self.ambient_light, self.sky_light)
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        let [x, y, z] = self.chunk_dims;
        ChunkDims::new(x, y, z)
    }
}
