use crate::{AssetLoader, AssetPath};
use super::Tileset;

/// Loader for a .tsx file.
/// Outputs a [`Tileset`].
pub struct TsxLoader;
impl AssetLoader for TsxLoader {
    type AssetType = Tileset;

    fn load(&self, bytes: &[u8], _path: &AssetPath) -> anyhow::Result<Tileset> {
        let tileset = Tileset::parse_bytes(bytes)?;
        Ok(tileset)
    }

    fn extensions(&self) -> &[&str] {
        &["tsx"]
    }
}

/// Loader for a tileset exported by Tiled as JSON.
/// Outputs a [`Tileset`].
pub struct JsonTilesetLoader;
impl AssetLoader for JsonTilesetLoader {
    type AssetType = Tileset;

    fn load(&self, bytes: &[u8], _path: &AssetPath) -> anyhow::Result<Tileset> {
        let source = std::str::from_utf8(bytes)?;
        let tileset = Tileset::from_json(source)?;
        Ok(tileset)
    }

    fn extensions(&self) -> &[&str] {
        &["json", "tsj"]
    }
}

#[cfg(test)]
mod test {
    use crate::{AssetManager, MemoryProtocol};
    use crate::tileset::{to_json, TilesetError};
    use super::{JsonTilesetLoader, Tileset, TsxLoader};

    const CLASSIC: &str = include_str!("../../assets/tileset_classic.tsx");

    #[test]
    fn both_formats_load_the_same_tileset() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let protocol = MemoryProtocol::default()
            .with_file("classic.tsx", CLASSIC)
            .with_file("classic.json", to_json(&tileset).unwrap());
        let mut manager = AssetManager::new();
        manager.add_protocol(protocol, true);
        manager.try_add_loader(TsxLoader).unwrap();
        manager.try_add_loader(JsonTilesetLoader).unwrap();

        let from_xml = manager.load::<Tileset>("classic.tsx").unwrap();
        let from_json = manager.load::<Tileset>("classic.json").unwrap();
        assert_eq!(tileset, from_xml);
        assert_eq!(from_xml.tiles, from_json.tiles);
        assert_eq!(from_xml.image.source, from_json.image.source);
    }

    #[test]
    fn loader_keeps_the_error() {
        let protocol = MemoryProtocol::default().with_file("broken.tsx", "<tileset><image/></tileset>");
        let mut manager = AssetManager::new();
        manager.add_protocol(protocol, true);
        manager.try_add_loader(TsxLoader).unwrap();
        let err = manager.load::<Tileset>("broken.tsx").unwrap_err();
        let err = err.downcast_ref::<TilesetError>().unwrap();
        assert!(err.is_schema_error());
    }
}
