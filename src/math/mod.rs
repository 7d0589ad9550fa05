mod polygon;

pub use polygon::*;
