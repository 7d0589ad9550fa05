mod geometry;
mod handle;
mod registry;
mod store;

pub use geometry::*;
pub use handle::*;
pub use registry::*;
pub use store::*;
