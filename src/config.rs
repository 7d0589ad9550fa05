use std::path::{Path, PathBuf};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings for a [`TilesetRegistry`](crate::TilesetRegistry), usually read from a YAML file.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory that tileset and image paths are relative to.
    pub asset_root: PathBuf,
    /// Decode a tileset's new images on the rayon pool before handles are assigned.
    pub parallel_decode: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            parallel_decode: true,
        }
    }
}

impl RegistryConfig {

    pub fn from_yaml_str(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml_str(&source)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}
