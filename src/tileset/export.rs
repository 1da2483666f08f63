use std::path::{Path, PathBuf};
use super::{to_json, write_tsx, Tileset, TilesetError};

/// File format a tileset can be written in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TilesetFormat {
    Tsx,
    Json,
}

impl TilesetFormat {

    /// Format implied by a file's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?;
        match extension {
            "tsx" => Some(Self::Tsx),
            "json" | "tsj" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn write(self, tileset: &Tileset) -> Result<String, TilesetError> {
        match self {
            Self::Tsx => write_tsx(tileset),
            Self::Json => to_json(tileset),
        }
    }
}

impl Tileset {

    /// Where the editor would export this tileset, resolved against the directory of the tileset file.
    pub fn export_path(&self, tileset_path: impl AsRef<Path>) -> Option<PathBuf> {
        let export = self.export_target()?;
        let dir = tileset_path.as_ref().parent().unwrap_or(Path::new(""));
        Some(dir.join(&export.target))
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};
    use crate::tileset::Tileset;
    use super::TilesetFormat;

    const CLASSIC: &str = include_str!("../../assets/tileset_classic.tsx");

    #[test]
    fn format_from_extension() {
        assert_eq!(Some(TilesetFormat::Tsx), TilesetFormat::from_path("sheets/a.tsx"));
        assert_eq!(Some(TilesetFormat::Json), TilesetFormat::from_path("a.json"));
        assert_eq!(Some(TilesetFormat::Json), TilesetFormat::from_path("a.tsj"));
        assert_eq!(None, TilesetFormat::from_path("a.png"));
        assert_eq!(None, TilesetFormat::from_path("tileset"));
    }

    #[test]
    fn written_format() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let json = TilesetFormat::Json.write(&tileset).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert_eq!(tileset, Tileset::from_json(&json).unwrap());

        let tsx = TilesetFormat::Tsx.write(&tileset).unwrap();
        assert!(tsx.starts_with("<?xml"));
        assert_eq!(tileset, Tileset::parse_str(&tsx).unwrap());
    }

    #[test]
    fn export_next_to_tileset() {
        let mut tileset = Tileset::parse_str(CLASSIC).unwrap();
        assert_eq!(
            Some(PathBuf::from("assets/tilesets/tileset_classic.json")),
            tileset.export_path("assets/tilesets/tileset_classic.tsx"),
        );
        assert_eq!(Some(PathBuf::from("tileset_classic.json")), tileset.export_path(Path::new("tileset_classic.tsx")));

        tileset.editor_settings = None;
        assert_eq!(None, tileset.export_path("tileset_classic.tsx"));
    }
}
