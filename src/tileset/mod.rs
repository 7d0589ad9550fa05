//! Structs defined here are a mostly 1:1 mapping of the TSX format.
//! They do not store image handles or validated geometry; see [`crate::TilesetRegistry`].
mod error;
mod parse;

pub use error::*;
pub use parse::*;
