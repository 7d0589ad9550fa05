use glam::{UVec2, Vec2};
use roxmltree::{Document, Node};
use crate::TsxParseError;

/// A mostly 1:1 mapping of a TSX <tileset> element.
/// Image references are left unresolved.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct TilesetDef {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    /// 0 for collections of images with irregular packing.
    pub columns: u32,
    pub grid: Option<GridDef>,
    /// Tiles in declaration order.
    pub tiles: Vec<TileDef>,
}

impl TilesetDef {

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, TsxParseError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    pub fn parse_str(source: &str) -> Result<Self, TsxParseError> {
        let doc = Document::parse(source)?;
        Self::parse_doc(doc)
    }

    pub fn parse_doc(doc: Document) -> Result<Self, TsxParseError> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "tileset" {
            return Err(TsxParseError::UnexpectedRoot { tag_name: String::from(tag_name) });
        }
        let mut tileset = Self::default();
        tileset.parse(root)?;
        Ok(tileset)
    }

    pub fn parse(&mut self, tileset_node: Node) -> Result<(), TsxParseError> {

        // Parses attributes
        for attribute in tileset_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "name" => self.name = String::from(value),
                "tilewidth" => self.tile_width = value.parse()?,
                "tileheight" => self.tile_height = value.parse()?,
                "tilecount" => self.tile_count = value.parse()?,
                "columns" => self.columns = value.parse()?,
                _ => {}
            }
        }

        // Parses children
        for child in tileset_node.children() {
            match child.tag_name().name() {
                "grid" => self.grid = Some(GridDef::parse(child)?),
                "tile" => self.tiles.push(TileDef::parse(child)?),
                _ => {}
            }
        }
        Ok(())
    }

    /// Nominal tile size. Individual tile images may be larger or smaller.
    pub fn tile_size(&self) -> UVec2 {
        UVec2::new(self.tile_width, self.tile_height)
    }

    pub fn is_irregular(&self) -> bool {
        self.columns == 0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum GridOrientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl GridOrientation {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "orthogonal" => Ok(Self::Orthogonal),
            "isometric" => Ok(Self::Isometric),
            _ => Err(TsxParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct GridDef {
    pub orientation: GridOrientation,
    pub width: u32,
    pub height: u32,
}

impl GridDef {
    fn parse(grid_node: Node) -> Result<Self, TsxParseError> {
        let mut grid = Self::default();
        for attribute in grid_node.attributes() {
            let value = attribute.value();
            match attribute.name() {
                "orientation" => grid.orientation = GridOrientation::parse(value)?,
                "width" => grid.width = value.parse()?,
                "height" => grid.height = value.parse()?,
                _ => {}
            }
        }
        Ok(grid)
    }
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct TileDef {
    /// ID of tile local to its tileset
    pub id: u32,
    pub image: ImageDef,
    /// None when the tile has no <objectgroup>.
    pub shapes: Option<Vec<ShapeDef>>,
}

impl TileDef {
    fn parse(tile_node: Node) -> Result<Self, TsxParseError> {
        let id: u32 = required_attribute(tile_node, "id")?.parse()?;
        let mut image = None;
        let mut shapes: Option<Vec<ShapeDef>> = None;
        for child in tile_node.children() {
            match child.tag_name().name() {
                "image" => image = Some(ImageDef::parse(child)?),
                "objectgroup" => {
                    let group = shapes.get_or_insert_with(Vec::new);
                    for object in child.children().filter(|node| node.has_tag_name("object")) {
                        group.push(ShapeDef::parse(object)?);
                    }
                },
                _ => {}
            }
        }
        let image = image.ok_or_else(|| TsxParseError::MissingTag {
            tile_id: id,
            tag_name: String::from("image"),
        })?;
        Ok(Self { id, image, shapes })
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ImageDef {
    /// Path relative to the tileset file.
    pub source: String,
    pub width: u32,
    pub height: u32,
}

impl ImageDef {
    fn parse(image_node: Node) -> Result<Self, TsxParseError> {
        Ok(Self {
            source: String::from(required_attribute(image_node, "source")?),
            width: required_attribute(image_node, "width")?.parse()?,
            height: required_attribute(image_node, "height")?.parse()?,
        })
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

/// A collision shape as authored, relative to its anchor.
#[derive(Clone, PartialEq, Debug)]
pub enum ShapeDef {
    Polygon {
        anchor: Vec2,
        points: Vec<Vec2>,
    },
    Rectangle {
        anchor: Vec2,
        size: Vec2,
    },
    /// Ellipses, polylines, points and text carry no usable outline.
    Unsupported {
        kind: String,
    },
}

impl ShapeDef {

    pub fn polygon(anchor: Vec2, points: impl IntoIterator<Item = Vec2>) -> Self {
        Self::Polygon {
            anchor,
            points: points.into_iter().collect(),
        }
    }

    fn parse(object_node: Node) -> Result<Self, TsxParseError> {
        let anchor = Vec2::new(
            optional_float(object_node, "x")?.unwrap_or(0.0),
            optional_float(object_node, "y")?.unwrap_or(0.0),
        );
        let rotation = optional_float(object_node, "rotation")?.unwrap_or(0.0);
        for child in object_node.children() {
            let tag_name = child.tag_name().name();
            match tag_name {
                "polygon" => {
                    let points = parse_points(required_attribute(child, "points")?)?;
                    return Ok(Self::Polygon { anchor, points: rotate(points, rotation) });
                },
                "polyline" | "ellipse" | "point" | "text" => {
                    return Ok(Self::Unsupported { kind: String::from(tag_name) });
                },
                _ => {}
            }
        }
        let size = Vec2::new(
            optional_float(object_node, "width")?.unwrap_or(0.0),
            optional_float(object_node, "height")?.unwrap_or(0.0),
        );
        if rotation == 0.0 {
            return Ok(Self::Rectangle { anchor, size });
        }
        let corners = vec![Vec2::ZERO, Vec2::new(size.x, 0.0), size, Vec2::new(0.0, size.y)];
        Ok(Self::Polygon { anchor, points: rotate(corners, rotation) })
    }
}

/// Rotates points around the object's anchor by degrees, clockwise on screen (y down).
fn rotate(points: Vec<Vec2>, degrees: f32) -> Vec<Vec2> {
    if degrees == 0.0 {
        return points;
    }
    let rotation = Vec2::from_angle(degrees.to_radians());
    points.into_iter().map(|point| rotation.rotate(point)).collect()
}

/// Parses a point list in the form "x,y x,y ...".
fn parse_points(value: &str) -> Result<Vec<Vec2>, TsxParseError> {
    value
        .split_whitespace()
        .map(|pair| -> Result<Vec2, TsxParseError> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| TsxParseError::InvalidAttributeValue { value: String::from(pair) })?;
            Ok(Vec2::new(x.trim().parse()?, y.trim().parse()?))
        })
        .collect()
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, TsxParseError> {
    node.attribute(attribute).ok_or_else(|| TsxParseError::MissingAttribute {
        tag_name: String::from(node.tag_name().name()),
        attribute: String::from(attribute),
    })
}

fn optional_float(node: Node, attribute: &str) -> Result<Option<f32>, TsxParseError> {
    match node.attribute(attribute) {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}
