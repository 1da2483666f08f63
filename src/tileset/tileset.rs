use std::path::{Path, PathBuf};
use glam::UVec2;
use roxmltree::Document;
use tracing::instrument;
use crate::URect;
use super::{parse, ParseError, Properties, Property, PropertyValue, SchemaError, Tile, TilesetError};

/// A validated tileset.
/// Required attributes are guaranteed present, and tiles keep their document order.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tileset {
    pub version: String,
    pub tiled_version: String,
    pub name: String,
    pub class: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    pub editor_settings: Option<EditorSettings>,
    pub properties: Properties,
    pub image: TilesetImage,
    pub tiles: Vec<Tile>,
}

impl Tileset {

    /// Parses the contents of a .tsx file.
    #[instrument(skip_all)]
    pub fn parse_str(source: &str) -> Result<Self, TilesetError> {
        let doc = Document::parse(source)?;
        Self::parse_doc(&doc)
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, TilesetError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    pub fn parse_doc(doc: &Document) -> Result<Self, TilesetError> {
        let parsed = parse::Tileset::parse_doc(doc)?;
        let tileset = Self::from_parsed(parsed)?;
        log::debug!("Parsed tileset '{}' with {} described tiles", tileset.name, tileset.tiles.len());
        Ok(tileset)
    }

    /// Checks that everything required is present.
    pub fn from_parsed(parsed: parse::Tileset) -> Result<Self, SchemaError> {
        let tile_width = parsed.tile_width.ok_or(SchemaError::MissingAttribute {
            element: "tileset",
            attribute: "tilewidth",
        })?;
        let tile_height = parsed.tile_height.ok_or(SchemaError::MissingAttribute {
            element: "tileset",
            attribute: "tileheight",
        })?;
        let image = parsed.image.ok_or(SchemaError::MissingElement {
            parent: "tileset",
            element: "image",
        })?;
        let image = TilesetImage::from_parsed(image)?;

        // Older files omit these. They can be recovered from the image when its size is known.
        let columns = match parsed.columns {
            Some(columns) => columns,
            None => {
                let width = image.width
                    .ok_or(SchemaError::MissingAttribute { element: "tileset", attribute: "columns" })?;
                fit_count(width, tile_width, parsed.margin, parsed.spacing)
                    .ok_or(SchemaError::UnderivableCount { attribute: "columns" })?
            },
        };
        let tile_count = match parsed.tile_count {
            Some(tile_count) => tile_count,
            None => {
                let height = image.height
                    .ok_or(SchemaError::MissingAttribute { element: "tileset", attribute: "tilecount" })?;
                fit_count(height, tile_height, parsed.margin, parsed.spacing)
                    .and_then(|rows| columns.checked_mul(rows))
                    .ok_or(SchemaError::UnderivableCount { attribute: "tilecount" })?
            },
        };

        let tiles = parsed.tiles
            .into_iter()
            .map(tile_from_parsed)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: parsed.version.unwrap_or_default(),
            tiled_version: parsed.tiled_version.unwrap_or_default(),
            name: parsed.name,
            class: parsed.class,
            tile_width,
            tile_height,
            spacing: parsed.spacing,
            margin: parsed.margin,
            tile_count,
            columns,
            object_alignment: parsed.object_alignment,
            tile_render_size: parsed.tile_render_size,
            fill_mode: parsed.fill_mode,
            tile_offset: parsed.tile_offset,
            grid: parsed.grid,
            editor_settings: parsed.editor_settings,
            properties: properties_from_parsed(parsed.properties)?,
            image,
            tiles,
        })
    }

    /// Tile with explicit metadata, if any.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    pub fn property(&self, id: u32, name: &str) -> Option<&PropertyValue> {
        self.tile(id)?.properties.get(name)
    }

    pub fn bool_property(&self, id: u32, name: &str) -> Option<bool> {
        self.property(id, name)?.as_bool()
    }

    /// Value of a bool property on a tile.
    /// Tiles without the property, or without any metadata, read as false.
    pub fn flag(&self, id: u32, name: &str) -> bool {
        self.bool_property(id, name).unwrap_or(false)
    }

    pub fn is_blocking(&self, id: u32) -> bool {
        self.flag(id, "blocking")
    }

    pub fn is_destroyable(&self, id: u32) -> bool {
        self.flag(id, "destroyable")
    }

    pub fn rows(&self) -> u32 {
        if self.columns == 0 { return 0 }
        self.tile_count.div_ceil(self.columns)
    }

    /// Where tile `id` sits in the sheet image.
    /// Tiles are laid out row-major, skipping margin and spacing.
    /// None if the tile is out of range or its position doesn't fit in a u32.
    pub fn tile_rect(&self, id: u32) -> Option<URect> {
        if id >= self.tile_count || self.columns == 0 {
            return None;
        }
        let offset = |index: u32, size: u32| {
            size.checked_add(self.spacing)?
                .checked_mul(index)?
                .checked_add(self.margin)
        };
        Some(URect::new(
            offset(id % self.columns, self.tile_width)?,
            offset(id / self.columns, self.tile_height)?,
            self.tile_width,
            self.tile_height,
        ))
    }

    /// Rectangles of every tile, indexed by tile id.
    pub fn tile_rects(&self) -> impl Iterator<Item = URect> + '_ {
        (0..self.tile_count).filter_map(|id| self.tile_rect(id))
    }

    /// Image size implied by tile size, columns, rows, margin and spacing.
    /// None if it is too large for a u32.
    pub fn expected_image_size(&self) -> Option<UVec2> {
        let span = |count: u32, size: u32| {
            if count == 0 { return Some(0) }
            self.margin.checked_mul(2)?
                .checked_add(count.checked_mul(size)?)?
                .checked_add((count - 1).checked_mul(self.spacing)?)
        };
        Some(UVec2::new(
            span(self.columns, self.tile_width)?,
            span(self.rows(), self.tile_height)?,
        ))
    }

    /// Declared image size, if both dimensions are present.
    pub fn declared_image_size(&self) -> Option<UVec2> {
        Some(UVec2::new(self.image.width?, self.image.height?))
    }

    /// Path of the sheet image, relative to the directory holding the tileset.
    pub fn image_path(&self, base_dir: impl AsRef<Path>) -> PathBuf {
        base_dir.as_ref().join(&self.image.source)
    }

    /// File the editor writes when exporting, if configured.
    pub fn export_target(&self) -> Option<&Export> {
        self.editor_settings.as_ref()?.export.as_ref()
    }
}

/// How many tiles fit in a length of the sheet.
fn fit_count(length: u32, size: u32, margin: u32, spacing: u32) -> Option<u32> {
    let stride = size.checked_add(spacing)?;
    if stride == 0 { return None }
    let usable = length.saturating_sub(margin.saturating_mul(2));
    Some(usable.checked_add(spacing)? / stride)
}

fn tile_from_parsed(parsed: parse::Tile) -> Result<Tile, SchemaError> {
    let id = parsed.id.ok_or(SchemaError::MissingAttribute { element: "tile", attribute: "id" })?;
    Ok(Tile {
        id,
        kind: parsed.kind,
        probability: parsed.probability,
        properties: properties_from_parsed(parsed.properties)?,
    })
}

pub(crate) fn properties_from_parsed(parsed: Vec<parse::Property>) -> Result<Properties, SchemaError> {
    parsed
        .into_iter()
        .map(|property| {
            let name = property.name.ok_or(SchemaError::MissingAttribute {
                element: "property",
                attribute: "name",
            })?;
            match property.value {
                Some(value) => Ok(Property { name, value }),
                None => Err(SchemaError::MissingValue { name }),
            }
        })
        .collect()
}

/// The sheet image that tiles are cut from.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct TilesetImage {
    /// Path exactly as written in the file.
    pub source: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub trans: Option<String>,
    pub format: Option<String>,
}

impl TilesetImage {
    pub fn new(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    fn from_parsed(parsed: parse::Image) -> Result<Self, SchemaError> {
        let source = parsed.source.ok_or(SchemaError::MissingAttribute {
            element: "image",
            attribute: "source",
        })?;
        Ok(Self {
            source,
            width: parsed.width,
            height: parsed.height,
            trans: parsed.trans,
            format: parsed.format,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct EditorSettings {
    pub export: Option<Export>,
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Export {
    pub target: String,
    pub format: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum ObjectAlignment {
    #[default]
    Unspecified,
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ObjectAlignment {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "unspecified" => Ok(Self::Unspecified),
            "topleft" => Ok(Self::TopLeft),
            "top" => Ok(Self::Top),
            "topright" => Ok(Self::TopRight),
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "bottomleft" => Ok(Self::BottomLeft),
            "bottom" => Ok(Self::Bottom),
            "bottomright" => Ok(Self::BottomRight),
            _ => Err(ParseError::invalid_value("objectalignment", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::TopLeft => "topleft",
            Self::Top => "top",
            Self::TopRight => "topright",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottomleft",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottomright",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum FillMode {
    #[default]
    Stretch,
    PreserveAspectFit,
}

impl FillMode {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "stretch" => Ok(Self::Stretch),
            "preserve-aspect-fit" => Ok(Self::PreserveAspectFit),
            _ => Err(ParseError::invalid_value("fillmode", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::PreserveAspectFit => "preserve-aspect-fit",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum TileRenderSize {
    #[default]
    Tile,
    Grid,
}

impl TileRenderSize {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "tile" => Ok(Self::Tile),
            "grid" => Ok(Self::Grid),
            _ => Err(ParseError::invalid_value("tilerendersize", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Grid => "grid",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "orthogonal" => Ok(Self::Orthogonal),
            "isometric" => Ok(Self::Isometric),
            "staggered" => Ok(Self::Staggered),
            "hexagonal" => Ok(Self::Hexagonal),
            _ => Err(ParseError::invalid_value("orientation", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
            Self::Staggered => "staggered",
            Self::Hexagonal => "hexagonal",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Grid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}
