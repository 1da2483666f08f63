//! Tiled maps, and levels binding a map to the tilesets its tiles come from.
mod error;
mod gid;
mod json;
mod layer;
mod level;
mod loader;
mod map;

pub use error::*;
pub use gid::*;
pub use json::*;
pub use layer::*;
pub use level::*;
pub use loader::*;
pub use map::*;
