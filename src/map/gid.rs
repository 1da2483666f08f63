use std::fmt;

/// Global tile id as stored in layer data.
/// The three high bits are flip flags, the rest indexes into the map's tilesets.
/// Zero means the cell is empty.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, Ord, PartialOrd)]
pub struct Gid(pub u32);

impl Gid {
    pub const EMPTY: Gid = Gid(0);
    pub const FLIPPED_HORIZONTALLY: u32 = 0x80000000;
    pub const FLIPPED_VERTICALLY: u32 = 0x40000000;
    pub const FLIPPED_DIAGONALLY: u32 = 0x20000000;
    const FLAGS: u32 = Self::FLIPPED_HORIZONTALLY | Self::FLIPPED_VERTICALLY | Self::FLIPPED_DIAGONALLY;

    /// Id with the flip flags masked off.
    pub fn id(self) -> u32 {
        self.0 & !Self::FLAGS
    }

    pub fn is_empty(self) -> bool {
        self.id() == 0
    }

    pub fn flipped_horizontally(self) -> bool { self.0 & Self::FLIPPED_HORIZONTALLY != 0 }
    pub fn flipped_vertically(self) -> bool { self.0 & Self::FLIPPED_VERTICALLY != 0 }
    pub fn flipped_diagonally(self) -> bool { self.0 & Self::FLIPPED_DIAGONALLY != 0 }
}

impl From<u32> for Gid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A [`Gid`] resolved against a map's tilesets.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct TileRef {
    /// Index into the map's tileset entries.
    pub tileset_index: usize,
    /// ID of tile local to its tileset.
    pub tile_id: u32,
}
