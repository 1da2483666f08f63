//! Tiled tilesets: reading (.tsx), writing, JSON export and integrity checks.
mod error;
mod export;
mod json;
mod loader;
mod property;
mod tile;
mod tileset;
mod validate;
mod write;
pub mod parse;

pub use error::*;
pub use export::*;
pub use json::*;
pub use loader::*;
pub use property::*;
pub use tile::*;
pub use tileset::*;
pub use validate::*;
pub use write::*;
