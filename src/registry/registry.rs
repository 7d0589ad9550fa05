use std::sync::Arc;
use tracing::instrument;
use crate::{
    read_asset, AssetPath, FileProtocol, GeometryStaging, GeometryTable, GlobalTileHandle, HashSet, ImageResolver,
    LoadError, LoadErrorKind, Protocol, QueryError, RegistryConfig, TileCollision, TileRecord, TileStore, Tileset,
    TilesetDef, TilesetHandle, TsxParseError,
};
use super::store::{PendingTile, PendingTileset};

/// Observable state of a [`TilesetRegistry`].
///
/// A tileset being loaded is staged privately and only committed once every tile validated.
/// Loading holds `&mut self`, so no reader can observe a registry mid-load and there is no `Loading` state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RegistryState {
    /// No tileset is registered.
    Empty,
    /// At least one tileset is registered and queryable.
    Ready,
}

/// Loads tilesets, assigns global tile handles and answers tile, image and collision queries.
///
/// Loading takes `&mut self` and is atomic per tileset: a tileset is either registered
/// with every one of its tiles, or not at all. Queries take `&self` and only read
/// immutable data, so a shared registry can be queried from many threads at once.
pub struct TilesetRegistry {
    resolver: ImageResolver,
    store: TileStore,
    geometry: GeometryTable,
    parallel_decode: bool,
}

impl TilesetRegistry {

    pub fn new(protocol: impl Protocol, parallel_decode: bool) -> Self {
        Self::from_shared(Arc::new(protocol), parallel_decode)
    }

    pub fn from_shared(protocol: Arc<dyn Protocol>, parallel_decode: bool) -> Self {
        Self {
            resolver: ImageResolver::from_shared(protocol),
            store: TileStore::default(),
            geometry: GeometryTable::default(),
            parallel_decode,
        }
    }

    /// Registry reading files from the configured asset root.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(FileProtocol::new(config.asset_root.clone()), config.parallel_decode)
    }

    pub fn state(&self) -> RegistryState {
        match self.store.tileset_count() {
            0 => RegistryState::Empty,
            _ => RegistryState::Ready,
        }
    }

    /// Reads, parses and registers a TSX file.
    /// Image references are resolved relative to the file's directory.
    #[instrument(skip(self))]
    pub fn load_tileset(&mut self, path: &str) -> Result<TilesetHandle, LoadError> {
        let source = AssetPath::parse(path).map_err(|_| {
            LoadError::new(path, LoadErrorKind::AssetNotFound { path: String::from(path) })
        })?;
        let bytes = read_asset(self.resolver.protocol().as_ref(), &source)
            .map_err(|kind| LoadError::new(path, kind))?;
        let definition = TilesetDef::parse_bytes(&bytes)
            .map_err(|err| LoadError::new(path, LoadErrorKind::Parse(err)))?;
        let base_dir = source.parent().unwrap_or("").to_owned();
        self.register(definition, &base_dir, Some(source))
    }

    /// Registers an already parsed tileset.
    /// Image references are resolved relative to `base_dir`, where "" is the asset root.
    pub fn register_tileset(&mut self, definition: TilesetDef, base_dir: &str) -> Result<TilesetHandle, LoadError> {
        self.register(definition, base_dir, None)
    }

    #[instrument(skip_all, fields(name = %definition.name))]
    fn register(&mut self, definition: TilesetDef, base_dir: &str, source: Option<AssetPath>) -> Result<TilesetHandle, LoadError> {
        let name = match (definition.name.is_empty(), &source) {
            (true, Some(source)) => file_stem(source).to_owned(),
            _ => definition.name.clone(),
        };
        if name.is_empty() {
            let missing_name = TsxParseError::MissingAttribute {
                tag_name: String::from("tileset"),
                attribute: String::from("name"),
            };
            let label = source.as_ref().map(AssetPath::to_string).unwrap_or_default();
            return Err(LoadError::new(label, LoadErrorKind::Parse(missing_name)));
        }
        if self.store.contains_name(&name) {
            return Err(LoadError::new(name, LoadErrorKind::DuplicateTileset));
        }
        if definition.tile_count as usize != definition.tiles.len() {
            log::warn!(
                "Tileset '{name}' declares {} tiles but defines {}",
                definition.tile_count,
                definition.tiles.len(),
            );
        }

        // Resolves paths up front so that new images can be decoded in parallel.
        let paths: Vec<_> = definition.tiles
            .iter()
            .map(|tile| AssetPath::join(base_dir, &tile.image.source))
            .collect();
        if self.parallel_decode {
            self.resolver.preload(paths.iter().filter_map(|path| path.as_ref().ok()));
        }

        // Validates every tile before anything becomes observable.
        let mut seen = HashSet::default();
        let mut staging = GeometryStaging::default();
        let mut tiles = Vec::with_capacity(definition.tiles.len());
        for (tile, path) in definition.tiles.iter().zip(&paths) {
            let tile_error = |kind| LoadError::tile(name.as_str(), tile.id, kind);
            if !seen.insert(tile.id) {
                return Err(tile_error(LoadErrorKind::DuplicateLocalId));
            }
            let path = path.as_ref().map_err(|_| {
                tile_error(LoadErrorKind::AssetNotFound { path: tile.image.source.clone() })
            })?;
            let image = self.resolver
                .resolve(path, tile.image.size())
                .map_err(tile_error)?;
            if !definition.is_irregular() && image.size() != definition.tile_size() {
                log::warn!("Tile {} of grid tileset '{name}' is {} instead of {}", tile.id, image.size(), definition.tile_size());
            }
            if let Some(shapes) = &tile.shapes {
                staging
                    .attach_shapes(tile.id, shapes)
                    .map_err(|err| tile_error(LoadErrorKind::MalformedGeometry(err)))?;
            }
            tiles.push(PendingTile { local_id: tile.id, image });
        }

        // Commits
        let pending = PendingTileset {
            name,
            source,
            tile_size: definition.tile_size(),
            tile_count: definition.tile_count,
            columns: definition.columns,
            grid: definition.grid,
            tiles,
        };
        let (handle, tileset) = self.store.add_tileset(pending);
        for (local_id, tile_handle) in tileset.tiles() {
            if let Some(collision) = staging.take(local_id) {
                self.geometry.insert(tile_handle, collision);
            }
        }
        log::info!("Registered tileset '{}' with {} tiles", tileset.name, tileset.len());
        log::debug!("Next tile handle is {}", self.store.next_handle());
        Ok(handle)
    }

    /// Unregisters a tileset and all of its tiles.
    /// Callers must make sure no reader still queries its handles.
    pub fn unload_tileset(&mut self, handle: TilesetHandle) -> Result<Tileset, QueryError> {
        let tileset = self.store.remove_tileset(handle)?;
        for (_, tile_handle) in tileset.tiles() {
            self.geometry.remove(tile_handle);
        }
        log::info!("Unregistered tileset '{}'", tileset.name);
        Ok(tileset)
    }

    pub fn unload_tileset_by_name(&mut self, name: &str) -> Result<Tileset, QueryError> {
        let handle = self.store.tileset_handle(name)?;
        self.unload_tileset(handle)
    }

    pub fn get_tile(&self, handle: GlobalTileHandle) -> Result<&TileRecord, QueryError> {
        self.store.get_tile(handle)
    }

    /// Collision shapes of a tile. `Ok(None)` means the tile has no collision.
    pub fn get_geometry(&self, handle: GlobalTileHandle) -> Result<Option<&TileCollision>, QueryError> {
        self.store.get_tile(handle)?;
        Ok(self.geometry.get(handle))
    }

    /// Translates a tile id authored against a tileset into its global handle.
    pub fn translate_local_id(&self, tileset: &str, local_id: u32) -> Result<GlobalTileHandle, QueryError> {
        self.store.translate_local_id(tileset, local_id)
    }

    pub fn tile_by_local(&self, tileset: &str, local_id: u32) -> Result<&TileRecord, QueryError> {
        let handle = self.translate_local_id(tileset, local_id)?;
        self.get_tile(handle)
    }

    pub fn geometry_by_local(&self, tileset: &str, local_id: u32) -> Result<Option<&TileCollision>, QueryError> {
        let handle = self.translate_local_id(tileset, local_id)?;
        self.get_geometry(handle)
    }

    pub fn tileset(&self, handle: TilesetHandle) -> Result<&Tileset, QueryError> {
        self.store.tileset(handle)
    }

    pub fn tileset_by_name(&self, name: &str) -> Result<&Tileset, QueryError> {
        self.store.tileset_by_name(name)
    }

    pub fn tilesets(&self) -> impl Iterator<Item = (TilesetHandle, &Tileset)> {
        self.store.tilesets()
    }

    /// Number of tiles across all registered tilesets.
    pub fn tile_count(&self) -> usize {
        self.store.tile_count()
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }
}

/// File name without its final extension.
fn file_stem(path: &AssetPath) -> &str {
    let file_name = path.file_name();
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => file_name,
    }
}
