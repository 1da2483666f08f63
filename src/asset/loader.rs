use std::any::{Any, TypeId};
use crate::AssetPath;

/// Takes the contents of a file, and converts them into an asset.
pub trait AssetLoader: Send + Sync + 'static {
    type AssetType: Any + Send + Sync;
    fn load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Self::AssetType>;
    fn extensions(&self) -> &[&str];
}

impl<L: AssetLoader> DynLoader for L {

    fn dyn_load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Box<dyn Any + Send + Sync>> {
        let asset = self.load(bytes, path)?;
        Ok(Box::new(asset))
    }

    fn asset_type(&self) -> TypeId {
        TypeId::of::<L::AssetType>()
    }
}

/// Dynamic trait variant of [`AssetLoader`].
pub(crate) trait DynLoader: Send + Sync + 'static {
    fn dyn_load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Box<dyn Any + Send + Sync>>;
    fn asset_type(&self) -> TypeId;
}
