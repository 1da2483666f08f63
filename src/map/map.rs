use roxmltree::{Document, Node};
use tracing::instrument;
use crate::tileset::{parse, properties_from_parsed, Orientation, ParseError, Properties, Tileset};
use super::{Gid, MapError, TileLayer, TileRef};

/// A Tiled map with its tile layers.
/// External tilesets are only referenced. See [`crate::map::Level`] for a map bound to its tilesets.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct TileMap {
    pub version: String,
    pub tiled_version: String,
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub infinite: bool,
    pub properties: Properties,
    pub tilesets: Vec<TilesetEntry>,
    pub layers: Vec<TileLayer>,
}

impl TileMap {

    /// Parses the contents of a .tmx file.
    #[instrument(skip_all)]
    pub fn parse_str(source: &str) -> Result<Self, MapError> {
        let doc = Document::parse(source)?;
        Self::parse_doc(&doc)
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, MapError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    pub fn parse_doc(doc: &Document) -> Result<Self, MapError> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "map" {
            return Err(MapError::UnexpectedRoot { tag_name: String::from(tag_name) });
        }
        let mut map = Self::default();
        map.parse(root)?;
        log::debug!("Parsed {}x{} map with {} layers", map.width, map.height, map.layers.len());
        Ok(map)
    }

    fn parse(&mut self, map_node: Node) -> Result<(), MapError> {

        // Parses map attributes
        for attribute in map_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "version" => self.version = String::from(value),
                "tiledversion" => self.tiled_version = String::from(value),
                "orientation" => self.orientation = Orientation::parse(value)?,
                "renderorder" => self.render_order = RenderOrder::parse(value)?,
                "width" => self.width = parse::number(name, value)?,
                "height" => self.height = parse::number(name, value)?,
                "tilewidth" => self.tile_width = parse::number(name, value)?,
                "tileheight" => self.tile_height = parse::number(name, value)?,
                "infinite" => self.infinite = match value {
                    "0" => false,
                    "1" => true,
                    _ => return Err(ParseError::invalid_value(name, value).into()),
                },
                _ => {}
            }
        }
        if self.infinite {
            return Err(MapError::Infinite);
        }

        // Traverses children
        for node in map_node.children() {
            match node.tag_name().name() {
                "properties" => self.properties = properties_from_parsed(parse::parse_properties(node)?)?,
                "tileset" => self.tilesets.push(TilesetEntry::parse(node)?),
                "layer" => self.layers.push(TileLayer::parse(node)?),
                _ => {}
            }
        }
        Ok(())
    }

    /// The map's "title" property. Empty if it has none.
    pub fn title(&self) -> &str {
        self.properties
            .get("title")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
    }

    /// First tile layer with the name specified.
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Finds the tileset a gid belongs to, and the id of the tile within it.
    /// That tileset is the one with the greatest first gid not above the gid.
    /// None for empty cells, or gids below every first gid.
    pub fn resolve(&self, gid: Gid) -> Option<TileRef> {
        if gid.is_empty() { return None }
        let id = gid.id();
        let (tileset_index, entry) = self.tilesets
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.first_gid() <= id)
            .max_by_key(|(_, entry)| entry.first_gid())?;
        Some(TileRef {
            tileset_index,
            tile_id: id - entry.first_gid(),
        })
    }
}

/// A single tileset stored in a [`TileMap`].
/// Either stores the tileset, or references it in another file.
#[derive(Clone, PartialEq, Debug)]
pub enum TilesetEntry {
    Internal {
        first_gid: u32,
        tileset: Tileset,
    },
    External {
        first_gid: u32,
        source: String,
    }
}

impl TilesetEntry {

    pub fn first_gid(&self) -> u32 {
        match self {
            Self::Internal { first_gid, .. } => *first_gid,
            Self::External { first_gid, .. } => *first_gid,
        }
    }

    /// Path of the tileset file, relative to the map. None if embedded.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Internal { .. } => None,
            Self::External { source, .. } => Some(source),
        }
    }

    fn parse(entry_node: Node) -> Result<Self, MapError> {
        let first_gid = entry_node
            .attribute("firstgid")
            .ok_or(MapError::MissingAttribute { element: "tileset", attribute: "firstgid" })?;
        let first_gid = parse::number("firstgid", first_gid)?;
        match entry_node.attribute("source") {
            Some(source) => Ok(Self::External { first_gid, source: String::from(source) }),
            None => {
                let mut parsed = parse::Tileset::default();
                parsed.parse(entry_node)?;
                let tileset = Tileset::from_parsed(parsed)?;
                Ok(Self::Internal { first_gid, tileset })
            },
        }
    }
}

/// Order in which tiles are drawn.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl RenderOrder {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "right-down" => Ok(Self::RightDown),
            "right-up" => Ok(Self::RightUp),
            "left-down" => Ok(Self::LeftDown),
            "left-up" => Ok(Self::LeftUp),
            _ => Err(ParseError::invalid_value("renderorder", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RightDown => "right-down",
            Self::RightUp => "right-up",
            Self::LeftDown => "left-down",
            Self::LeftUp => "left-up",
        }
    }
}
