mod handle;
mod path;
mod protocol;
mod resolver;

pub use handle::*;
pub use path::*;
pub use protocol::*;
pub use resolver::*;

#[cfg(test)]
pub(crate) use resolver::test::png;
