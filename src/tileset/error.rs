use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;
use derive_more::*;

#[derive(Error, Display, From, Debug)]
pub enum TsxParseError {
    XmlError(roxmltree::Error),
    #[display(fmt="{_0}")]
    Utf8Error(Utf8Error),
    #[display(fmt="{_0}")]
    ParseIntError(ParseIntError),
    #[display(fmt="{_0}")]
    ParseFloatError(ParseFloatError),
    #[display(fmt="Expected root tag 'tileset', found '{tag_name}'")]
    #[from(ignore)]
    UnexpectedRoot { tag_name: String },
    #[display(fmt="Tag '{tag_name}' is missing attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { tag_name: String, attribute: String },
    #[display(fmt="Tile {tile_id} is missing tag '{tag_name}'")]
    #[from(ignore)]
    MissingTag { tile_id: u32, tag_name: String },
    #[display(fmt="Unexpected value {value}")]
    #[from(ignore)]
    InvalidAttributeValue { value: String },
}
