use std::any::TypeId;
use anyhow::Context;
use derive_more::*;
use tracing::instrument;
use crate::map::{JsonMapLoader, TmxLoader};
use crate::tileset::{JsonTilesetLoader, TsxLoader};
use crate::{AssetLoader, AssetPath, DynLoader, FileProtocol, HashMap, Protocol};

/// Reads files through protocols and turns them into assets with the loader registered
/// for the requested asset type and the file's extension.
pub struct AssetManager {
    protocols: HashMap<String, Box<dyn Protocol>>,
    default_protocol: Option<String>,
    loaders: Vec<Box<dyn DynLoader>>,
    extension_to_loader: HashMap<(TypeId, String), usize>,
}

impl AssetManager {

    pub fn new() -> Self {
        Self {
            protocols: HashMap::default(),
            default_protocol: None,
            loaders: Vec::default(),
            extension_to_loader: HashMap::default(),
        }
    }

    /// Manager reading from the file system, able to load tilesets and maps in both XML and JSON.
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();
        manager.add_protocol(FileProtocol, true);
        manager.insert_loader(TsxLoader);
        manager.insert_loader(JsonTilesetLoader);
        manager.insert_loader(TmxLoader);
        manager.insert_loader(JsonMapLoader);
        manager
    }

    /// Adds a protocol for use in loading bytes for asset loaders.
    pub fn add_protocol(&mut self, protocol: impl Protocol, is_default: bool) {
        let name = String::from(protocol.name());
        self.protocols.insert(name.clone(), Box::new(protocol));
        if is_default {
            self.default_protocol = Some(name);
        }
    }

    /// Adds a loader for transforming file bytes into assets.
    /// Fails if another loader already produces the same asset type from one of its extensions.
    pub fn try_add_loader<L: AssetLoader>(&mut self, loader: L) -> Result<(), LoadError> {
        let asset_type = TypeId::of::<L::AssetType>();
        for extension in loader.extensions() {
            if self.extension_to_loader.contains_key(&(asset_type, String::from(*extension))) {
                return Err(LoadError::ExtensionOverlaps { extension: String::from(*extension) });
            }
        }
        self.insert_loader(loader);
        Ok(())
    }

    fn insert_loader<L: AssetLoader>(&mut self, loader: L) {
        let asset_type = TypeId::of::<L::AssetType>();
        let loader_index = self.loaders.len();
        for extension in loader.extensions() {
            self.extension_to_loader.insert((asset_type, String::from(*extension)), loader_index);
        }
        self.loaders.push(Box::new(loader));
    }

    /// Parses a path, filling in the default protocol when it has none.
    pub fn parse_path(&self, path: &str) -> Result<AssetPath, LoadError> {
        AssetPath::parse(path, self.default_protocol.as_deref())
    }

    /// Reads the raw bytes of a file through its protocol.
    pub fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let protocol = self.protocols
            .get(&path.protocol)
            .ok_or_else(|| LoadError::NoSuchProtocol { protocol: path.protocol.clone() })?;
        protocol.read(path).with_context(|| format!("Failed to read {path}"))
    }

    /// Loads an asset from a path given as text.
    pub fn load<A: 'static>(&self, path: impl AsRef<str>) -> anyhow::Result<A> {
        let path = self.parse_path(path.as_ref())?;
        self.load_path(&path)
    }

    /// Reads a file and runs the loader registered for the asset type and the file's extension.
    #[instrument(skip_all, fields(path = %path))]
    pub fn load_path<A: 'static>(&self, path: &AssetPath) -> anyhow::Result<A> {
        let asset_type = TypeId::of::<A>();
        let loader_index = self.extension_to_loader
            .get(&(asset_type, path.extension.clone()))
            .ok_or_else(|| LoadError::NoSuchLoader { extension: path.extension.clone() })?;
        let loader = &self.loaders[*loader_index];
        let bytes = self.read(path)?;
        let asset = loader
            .dyn_load(&bytes, path)
            .with_context(|| format!("Failed to load {path}"))?;
        let asset = asset
            .downcast::<A>()
            .map_err(|_| LoadError::IncorrectAssetType)?;
        log::debug!("Loaded {path}");
        Ok(*asset)
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug, Display, Clone, Eq, PartialEq)]
pub enum LoadError {
    #[display(fmt="Incorrect asset type")]
    IncorrectAssetType,
    #[display(fmt="No default protocol")]
    NoDefaultProtocol,
    #[display(fmt="No such protocol '{protocol}'")]
    NoSuchProtocol { protocol: String },
    #[display(fmt="No loader matching extension '{extension}'")]
    NoSuchLoader { extension: String },
    #[display(fmt="Path '{path}' missing extension")]
    PathMissingExtension { path: String },
    #[display(fmt="Extension '{extension}' of one loader overlaps with another")]
    ExtensionOverlaps { extension: String },
}
