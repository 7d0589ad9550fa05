use std::fmt;
use derive_more::*;
use glam::UVec2;
use crate::math::GeometryError;
use crate::{GlobalTileHandle, TilesetHandle, TsxParseError};

/// Why a tileset failed to load.
#[derive(Error, Display, Debug)]
pub enum LoadErrorKind {
    #[display(fmt="Asset '{path}' not found")]
    AssetNotFound { path: String },
    #[display(fmt="Asset '{path}' could not be read: {reason}")]
    AssetUnreadable { path: String, reason: String },
    #[display(fmt="Image '{path}' could not be decoded: {source}")]
    AssetDecodeError { path: String, source: image::ImageError },
    #[display(fmt="Image '{path}' is declared as {declared} but decodes as {actual}")]
    DimensionMismatch { path: String, declared: UVec2, actual: UVec2 },
    #[display(fmt="Local tile id is declared more than once")]
    DuplicateLocalId,
    #[display(fmt="Malformed collision geometry: {_0}")]
    MalformedGeometry(GeometryError),
    #[display(fmt="Malformed tileset document: {_0}")]
    Parse(TsxParseError),
    #[display(fmt="A tileset with this name is already registered")]
    DuplicateTileset,
}

/// A load-time failure, with enough context to find the offending source data.
#[derive(Debug)]
pub struct LoadError {
    /// Tileset name, or its source path if the name is not known yet.
    pub tileset: String,
    /// Local id of the offending tile, if the failure is tile specific.
    pub tile_id: Option<u32>,
    pub kind: LoadErrorKind,
}

impl LoadError {

    pub fn new(tileset: impl Into<String>, kind: LoadErrorKind) -> Self {
        Self {
            tileset: tileset.into(),
            tile_id: None,
            kind,
        }
    }

    pub fn tile(tileset: impl Into<String>, tile_id: u32, kind: LoadErrorKind) -> Self {
        Self {
            tileset: tileset.into(),
            tile_id: Some(tile_id),
            kind,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile_id {
            Some(tile_id) => write!(f, "Failed to load tileset '{}', tile {}: {}", self.tileset, tile_id, self.kind),
            None => write!(f, "Failed to load tileset '{}': {}", self.tileset, self.kind),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Misuse of the registry's query operations.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum QueryError {
    #[display(fmt="Tile handle {handle} does not refer to a registered tile")]
    StaleHandle { handle: GlobalTileHandle },
    #[display(fmt="No tileset named '{name}' is registered")]
    UnknownTileset { name: String },
    #[display(fmt="Tileset handle {handle:?} refers to an unregistered tileset")]
    StaleTileset { handle: TilesetHandle },
    #[display(fmt="Tileset '{tileset}' declares no tile with local id {local_id}")]
    UnknownLocalId { tileset: String, local_id: u32 },
}
