mod asset;
mod config;
mod util;
pub mod map;
pub mod tileset;

pub use asset::*;
pub use config::*;
pub use util::*;
pub use map::{Level, TileMap};
pub use tileset::{Tileset, TilesetError};
