//! TOML definitions for cube tiles.
//!
//! ```toml
//! [[tiles]]
//! name = "grass"
//! color = [120, 200, 90, 255]
//! atlas = { top = [0.0, 0.0, 0.25, 0.25], side = [0.25, 0.0, 0.5, 0.25] }
//!
//! [[tiles]]
//! name = "glass"
//! alpha = true
//! translucency = 0.9
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::mesh::{AtlasRect, CubeStyle, MeshProperties, TileMeshDefinition};
use crate::registry::TileMeshRegistry;
use crate::types::{LIGHT_MAX, Rgba, Side, SideMask};

#[derive(Debug, Error)]
pub enum TileConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tile config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("tile `{0}` is defined twice")]
    DuplicateName(String),
    #[error("tile `{name}` has an atlas rect outside [0,1]")]
    AtlasOutOfRange { name: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct TilesConfig {
    #[serde(default)]
    pub tiles: Vec<TileDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TileDef {
    pub name: String,
    /// Faces the cube defines; all six when omitted.
    pub faces: Option<Vec<Side>>,
    /// Faces that block light and visibility; derived from `faces` when omitted.
    pub opaque: Option<Vec<Side>>,
    #[serde(default)]
    pub alpha: bool,
    #[serde(default)]
    pub translucency: f32,
    pub color: Option<[u8; 4]>,
    #[serde(default)]
    pub emission: u8,
    #[serde(default)]
    pub atlas: AtlasDef,
}

/// Per-role atlas rectangles; specific roles fall back to `all`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AtlasDef {
    pub all: Option<AtlasRect>,
    pub top: Option<AtlasRect>,
    pub bottom: Option<AtlasRect>,
    pub side: Option<AtlasRect>,
}

impl AtlasDef {
    fn rect_for(&self, side: Side) -> AtlasRect {
        let pick = match side {
            Side::Top => self.top.or(self.all),
            Side::Bottom => self.bottom.or(self.all),
            _ => self.side.or(self.all),
        };
        pick.unwrap_or(AtlasRect::FULL)
    }
}

impl TileDef {
    fn compile(&self) -> Result<TileMeshDefinition, TileConfigError> {
        let faces = self
            .faces
            .as_ref()
            .map_or(SideMask::ALL, |f| f.iter().copied().collect());
        let mut style = CubeStyle::uniform(AtlasRect::FULL).with_faces(faces);
        for side in Side::ALL {
            let rect = self.atlas.rect_for(side);
            if !rect.is_normalized() {
                return Err(TileConfigError::AtlasOutOfRange {
                    name: self.name.clone(),
                });
            }
            style = style.with_side_atlas(side, rect);
        }
        if !(0.0..=1.0).contains(&self.translucency) {
            log::warn!(
                "tile `{}`: translucency {} clamped to [0,1]",
                self.name,
                self.translucency
            );
        }
        if self.emission > LIGHT_MAX {
            log::warn!(
                "tile `{}`: emission {} clamped to {}",
                self.name,
                self.emission,
                LIGHT_MAX
            );
        }
        let props = MeshProperties {
            opaque_sides: self.opaque.as_ref().map(|o| o.iter().copied().collect()),
            alpha: self.alpha,
            translucency: self.translucency,
            color: self.color.map_or(Rgba::WHITE, Rgba::from_array),
            emission: self.emission,
        };
        Ok(TileMeshDefinition::cube(style, props))
    }
}

impl TileMeshRegistry {
    pub fn from_config(cfg: &TilesConfig) -> Result<Self, TileConfigError> {
        let mut reg = TileMeshRegistry::new();
        for def in &cfg.tiles {
            if reg.index_of(&def.name).is_some() {
                return Err(TileConfigError::DuplicateName(def.name.clone()));
            }
            reg.insert(def.name.clone(), def.compile()?);
        }
        log::debug!("loaded {} tile definitions", cfg.tiles.len());
        Ok(reg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, TileConfigError> {
        let cfg: TilesConfig = toml::from_str(toml_str)?;
        Self::from_config(&cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TileConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| TileConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }
}
