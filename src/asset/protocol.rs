use crate::{AssetPath, HashMap};

/**
 * A method of receiving bytes from files.
 * IE: file, raw, mem.
 */
pub trait Protocol: Send + Sync + 'static {
    /**
     * Name of the protocol. IE: file, raw etc.
     * Should not change across invocations.
     */
    fn name(&self) -> &str;
    /**
     * Retrieves raw bytes from the path specified.
     */
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
}

/**
 * An implementation of [`Protocol`] that fetches bytes from the file system.
 */
#[derive(Copy, Clone, Debug)]
pub struct FileProtocol;
impl Protocol for FileProtocol {
    fn name(&self) -> &str { "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let bytes = std::fs::read(path.without_protocol())?;
        Ok(bytes)
    }
}

/**
 * An implementation of [`Protocol`] that always returns the bytes it stores.
 * Useful for testing purposes.
 */
#[derive(Clone, Debug)]
pub struct RawProtocol(pub &'static [u8]);
impl From<&'static str> for RawProtocol {
    fn from(value: &'static str) -> Self {
        Self(value.as_bytes())
    }
}
impl Protocol for RawProtocol {
    fn name(&self) -> &str { "raw" }
    fn read(&self, _path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

/**
 * An implementation of [`Protocol`] that serves files kept in memory, keyed by path without protocol.
 * Lets a map and the tilesets it references be loaded without touching the disk.
 */
#[derive(Clone, Default, Debug)]
pub struct MemoryProtocol {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryProtocol {
    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }
}

impl Protocol for MemoryProtocol {
    fn name(&self) -> &str { "mem" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let key = path.without_protocol();
        match self.files.get(&key) {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("No file '{key}' in memory"),
        }
    }
}
