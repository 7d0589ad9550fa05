mod asset;
mod config;
mod error;
mod registry;
mod tileset;
mod util;
pub mod math;

pub use asset::*;
pub use config::*;
pub use error::*;
pub use registry::*;
pub use tileset::*;
pub use util::*;
