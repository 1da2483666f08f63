use crate::{AssetLoader, AssetPath};
use super::TileMap;

/// Loader for a .tmx file.
/// Outputs a [`TileMap`] with its external tilesets left unloaded.
pub struct TmxLoader;
impl AssetLoader for TmxLoader {
    type AssetType = TileMap;

    fn load(&self, bytes: &[u8], _path: &AssetPath) -> anyhow::Result<TileMap> {
        let map = TileMap::parse_bytes(bytes)?;
        Ok(map)
    }

    fn extensions(&self) -> &[&str] {
        &["tmx"]
    }
}

/// Loader for a map exported by Tiled as JSON.
pub struct JsonMapLoader;
impl AssetLoader for JsonMapLoader {
    type AssetType = TileMap;

    fn load(&self, bytes: &[u8], _path: &AssetPath) -> anyhow::Result<TileMap> {
        let source = std::str::from_utf8(bytes)?;
        let map = TileMap::from_json(source)?;
        Ok(map)
    }

    fn extensions(&self) -> &[&str] {
        &["json", "tmj"]
    }
}
