use glam::UVec2;
use slotmap::SlotMap;
use crate::{AssetPath, GlobalTileHandle, GridDef, HashMap, ImageHandle, QueryError, TilesetHandle};

/// A registered tile.
#[derive(Clone, PartialEq, Debug)]
pub struct TileRecord {
    pub handle: GlobalTileHandle,
    pub tileset: TilesetHandle,
    pub local_id: u32,
    pub image: ImageHandle,
    /// Pixel size of this tile's image, which may differ from the tileset's nominal tile size.
    pub size: UVec2,
}

/// A registered tileset.
/// Owns the translation from local tile ids to global handles.
#[derive(Clone, Debug)]
pub struct Tileset {
    pub name: String,
    /// File the tileset was loaded from, if any.
    pub source: Option<AssetPath>,
    pub tile_size: UVec2,
    pub tile_count: u32,
    pub columns: u32,
    pub grid: Option<GridDef>,
    tiles: Vec<(u32, GlobalTileHandle)>,
    local_to_global: HashMap<u32, GlobalTileHandle>,
}

impl Tileset {

    /// Global handle of a local tile id.
    pub fn global(&self, local_id: u32) -> Option<GlobalTileHandle> {
        self.local_to_global.get(&local_id).copied()
    }

    /// Local ids and their global handles, in declaration order.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, GlobalTileHandle)> + '_ {
        self.tiles.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// A tileset whose tiles are resolved and validated, waiting for handles.
pub(crate) struct PendingTileset {
    pub name: String,
    pub source: Option<AssetPath>,
    pub tile_size: UVec2,
    pub tile_count: u32,
    pub columns: u32,
    pub grid: Option<GridDef>,
    pub tiles: Vec<PendingTile>,
}

pub(crate) struct PendingTile {
    pub local_id: u32,
    pub image: ImageHandle,
}

/// Holds every tile of every registered tileset.
/// Records live in an arena indexed by [`GlobalTileHandle`]. Slots of unregistered tilesets stay empty.
#[derive(Default, Debug)]
pub struct TileStore {
    records: Vec<Option<TileRecord>>,
    tilesets: SlotMap<TilesetHandle, Tileset>,
    names: HashMap<String, TilesetHandle>,
}

impl TileStore {

    /// Mints handles for every pending tile in declaration order and registers the tileset.
    /// Local ids must already be known to be unique.
    pub(crate) fn add_tileset(&mut self, pending: PendingTileset) -> (TilesetHandle, &Tileset) {
        let PendingTileset { name, source, tile_size, tile_count, columns, grid, tiles: pending_tiles } = pending;
        let tileset_handle = self.tilesets.insert_with_key(|tileset_handle| {
            let mut tiles = Vec::with_capacity(pending_tiles.len());
            let mut local_to_global = HashMap::default();
            for tile in pending_tiles {
                let handle = GlobalTileHandle(self.records.len() as u32);
                let size = tile.image.size();
                self.records.push(Some(TileRecord {
                    handle,
                    tileset: tileset_handle,
                    local_id: tile.local_id,
                    image: tile.image,
                    size,
                }));
                tiles.push((tile.local_id, handle));
                local_to_global.insert(tile.local_id, handle);
            }
            Tileset { name: name.clone(), source, tile_size, tile_count, columns, grid, tiles, local_to_global }
        });
        self.names.insert(name, tileset_handle);
        (tileset_handle, &self.tilesets[tileset_handle])
    }

    /// Removes a tileset and all of its tile records.
    /// Handles of removed tiles are never minted again.
    pub(crate) fn remove_tileset(&mut self, handle: TilesetHandle) -> Result<Tileset, QueryError> {
        let tileset = self.tilesets
            .remove(handle)
            .ok_or(QueryError::StaleTileset { handle })?;
        self.names.remove(&tileset.name);
        for (_, tile_handle) in tileset.tiles() {
            if let Some(slot) = self.records.get_mut(tile_handle.index()) {
                *slot = None;
            }
        }
        Ok(tileset)
    }

    pub fn get_tile(&self, handle: GlobalTileHandle) -> Result<&TileRecord, QueryError> {
        self.records
            .get(handle.index())
            .and_then(Option::as_ref)
            .ok_or(QueryError::StaleHandle { handle })
    }

    pub fn tileset(&self, handle: TilesetHandle) -> Result<&Tileset, QueryError> {
        self.tilesets
            .get(handle)
            .ok_or(QueryError::StaleTileset { handle })
    }

    pub fn tileset_handle(&self, name: &str) -> Result<TilesetHandle, QueryError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownTileset { name: String::from(name) })
    }

    pub fn tileset_by_name(&self, name: &str) -> Result<&Tileset, QueryError> {
        let handle = self.tileset_handle(name)?;
        self.tileset(handle)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn translate_local_id(&self, name: &str, local_id: u32) -> Result<GlobalTileHandle, QueryError> {
        let tileset = self.tileset_by_name(name)?;
        tileset.global(local_id).ok_or_else(|| QueryError::UnknownLocalId {
            tileset: String::from(name),
            local_id,
        })
    }

    pub fn tilesets(&self) -> impl Iterator<Item = (TilesetHandle, &Tileset)> {
        self.tilesets.iter()
    }

    pub fn tileset_count(&self) -> usize {
        self.tilesets.len()
    }

    /// Number of live tile records.
    pub fn tile_count(&self) -> usize {
        self.tilesets.values().map(Tileset::len).sum()
    }

    /// Handle the next registered tile will receive.
    pub fn next_handle(&self) -> GlobalTileHandle {
        GlobalTileHandle(self.records.len() as u32)
    }
}
