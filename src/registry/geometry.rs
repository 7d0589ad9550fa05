use glam::Vec2;
use smallvec::SmallVec;
use crate::math::{GeometryError, Polygon};
use crate::{GlobalTileHandle, HashMap, ShapeDef};

/// A validated polygon and the anchor its points are relative to.
#[derive(Clone, PartialEq, Debug)]
pub struct CollisionPolygon {
    pub anchor: Vec2,
    pub polygon: Polygon,
}

impl CollisionPolygon {

    pub fn points(&self) -> &[Vec2] {
        self.polygon.points()
    }

    /// Points in tile-local coordinates, with the anchor applied.
    pub fn translated(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.polygon.translated(self.anchor)
    }
}

/// Collision shapes of a single tile, in declaration order. Never empty.
#[derive(Clone, PartialEq, Debug)]
pub struct TileCollision {
    shapes: SmallVec<[CollisionPolygon; 1]>,
}

impl TileCollision {

    /// First declared shape. Most tiles declare exactly one.
    pub fn primary(&self) -> &CollisionPolygon {
        &self.shapes[0]
    }

    pub fn shapes(&self) -> &[CollisionPolygon] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

/// Collision shapes attached while a tileset is loading, keyed by local tile id.
/// Validation happens here so that queries never see malformed geometry.
#[derive(Default, Debug)]
pub struct GeometryStaging {
    shapes: HashMap<u32, SmallVec<[CollisionPolygon; 1]>>,
}

impl GeometryStaging {

    /// Validates an outline, normalizes its winding and attaches it to a tile.
    pub fn attach_geometry(&mut self, local_id: u32, anchor: Vec2, outline: Vec<Vec2>) -> Result<(), GeometryError> {
        let polygon = Polygon::new(outline)?;
        self.shapes
            .entry(local_id)
            .or_default()
            .push(CollisionPolygon { anchor, polygon });
        Ok(())
    }

    /// Attaches the contents of a tile's object group.
    /// An object group without shapes is malformed, not an absence of collision.
    pub fn attach_shapes(&mut self, local_id: u32, shapes: &[ShapeDef]) -> Result<(), GeometryError> {
        if shapes.is_empty() {
            return Err(GeometryError::EmptyObjectGroup);
        }
        for shape in shapes {
            match shape {
                ShapeDef::Polygon { anchor, points } => self.attach_geometry(local_id, *anchor, points.clone())?,
                ShapeDef::Rectangle { anchor, size } => {
                    let polygon = Polygon::rectangle(*size)?;
                    self.shapes
                        .entry(local_id)
                        .or_default()
                        .push(CollisionPolygon { anchor: *anchor, polygon });
                },
                ShapeDef::Unsupported { kind } => {
                    return Err(GeometryError::UnsupportedShape { kind: kind.clone() });
                },
            }
        }
        Ok(())
    }

    pub(crate) fn take(&mut self, local_id: u32) -> Option<TileCollision> {
        self.shapes
            .remove(&local_id)
            .map(|shapes| TileCollision { shapes })
    }
}

/// Collision shapes of registered tiles.
/// Tiles without an entry have no collision.
#[derive(Default, Debug)]
pub struct GeometryTable {
    entries: HashMap<GlobalTileHandle, TileCollision>,
}

impl GeometryTable {

    pub fn get(&self, handle: GlobalTileHandle) -> Option<&TileCollision> {
        self.entries.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, handle: GlobalTileHandle, collision: TileCollision) {
        self.entries.insert(handle, collision);
    }

    pub(crate) fn remove(&mut self, handle: GlobalTileHandle) -> Option<TileCollision> {
        self.entries.remove(&handle)
    }
}
