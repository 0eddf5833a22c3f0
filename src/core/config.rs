//! Tiles renderer configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::tiles::transform::UpAxis;

/// Configuration for a [`TilesRenderer`](crate::tiles::TilesRenderer)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfig {
    /// Forces the glTF up axis instead of reading `asset.gltfUpAxis`
    pub up_axis_override: Option<UpAxis>,
    /// Byte budget for resident tile content
    pub max_bytes: usize,
    /// Maximum number of resident tiles
    pub max_tiles: usize,
    /// Fraction of `max_bytes` above which eviction is requested (0.0-1.0)
    pub eviction_threshold: f32,
    /// Count the ~4/3 mipmap chain when estimating texture bytes
    pub count_mipmaps: bool,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            up_axis_override: None,
            max_bytes: 512 * 1024 * 1024, // 512 MB of content
            max_tiles: 800,
            eviction_threshold: 0.9,
            count_mipmaps: true,
        }
    }
}

impl TilesConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file (sync)
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save to file (sync)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}
