use roxmltree::{Document, Node};
use crate::tileset::{
    EditorSettings, Export, FillMode, Grid, ObjectAlignment, Orientation, ParseError,
    PropertyType, PropertyValue, TileOffset, TileRenderSize,
};
use super::number;


#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tileset {
    pub version: Option<String>,
    pub tiled_version: Option<String>,
    pub name: String,
    pub class: String,
    pub tile_width: Option<u32>,
    pub tile_height: Option<u32>,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: Option<u32>,
    pub columns: Option<u32>,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    pub editor_settings: Option<EditorSettings>,
    pub properties: Vec<Property>,
    pub image: Option<Image>,
    pub tiles: Vec<Tile>,
}

impl Tileset {

    pub fn parse_doc(doc: &Document) -> Result<Self, ParseError> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "tileset" {
            return Err(ParseError::UnexpectedRoot { tag_name: String::from(tag_name) });
        }
        let mut tileset = Tileset::default();
        tileset.parse(root)?;
        Ok(tileset)
    }

    /// Parses a <tileset> node.
    /// Also used for tilesets embedded in a map.
    pub fn parse(&mut self, tileset_node: Node) -> Result<(), ParseError> {

        // Parses attributes
        for attribute in tileset_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "version" => self.version = Some(String::from(value)),
                "tiledversion" => self.tiled_version = Some(String::from(value)),
                "name" => self.name = String::from(value),
                "class" => self.class = String::from(value),
                "tilewidth" => self.tile_width = Some(number(name, value)?),
                "tileheight" => self.tile_height = Some(number(name, value)?),
                "spacing" => self.spacing = number(name, value)?,
                "margin" => self.margin = number(name, value)?,
                "tilecount" => self.tile_count = Some(number(name, value)?),
                "columns" => self.columns = Some(number(name, value)?),
                "objectalignment" => self.object_alignment = ObjectAlignment::parse(value)?,
                "tilerendersize" => self.tile_render_size = TileRenderSize::parse(value)?,
                "fillmode" => self.fill_mode = FillMode::parse(value)?,
                _ => {}
            }
        }

        // Parses children
        for child in tileset_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "editorsettings" => self.editor_settings = Some(parse_editor_settings(child)),
                "image" => self.image = Some(Image::parse(child)?),
                "tileoffset" => self.tile_offset = Some(parse_tile_offset(child)?),
                "grid" => self.grid = Some(parse_grid(child)?),
                "properties" => self.properties = parse_properties(child)?,
                "tile" => self.tiles.push(Tile::parse(child)?),
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    pub format: Option<String>,
    pub source: Option<String>,
    pub trans: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Image {
    pub fn parse(image_node: Node) -> Result<Image, ParseError> {
        let mut image = Image::default();
        for attribute in image_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "format" => image.format = Some(String::from(value)),
                "source" => image.source = Some(String::from(value)),
                "trans" => image.trans = Some(String::from(value)),
                "width" => image.width = Some(number(name, value)?),
                "height" => image.height = Some(number(name, value)?),
                _ => {}
            }
        }
        Ok(image)
    }
}

#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tile {
    pub id: Option<u32>,
    pub kind: String,
    pub probability: Option<f32>,
    pub properties: Vec<Property>,
}

impl Tile {
    pub fn parse(tile_node: Node) -> Result<Tile, ParseError> {
        let mut tile = Tile::default();
        for attribute in tile_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "id" => tile.id = Some(number(name, value)?),
                "type" | "class" => tile.kind = String::from(value),
                "probability" => tile.probability = Some(number(name, value)?),
                _ => {}
            }
        }
        for child in tile_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "properties" => tile.properties = parse_properties(child)?,
                _ => {}
            }
        }
        Ok(tile)
    }
}

/// A <property> with its value already checked against its declared type.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Property {
    pub name: Option<String>,
    pub value: Option<PropertyValue>,
}

impl Property {
    pub fn parse(property_node: Node) -> Result<Property, ParseError> {
        let mut name = None;
        let mut property_type = PropertyType::default();
        let mut raw_value = None;
        for attribute in property_node.attributes() {
            match attribute.name() {
                "name" => name = Some(String::from(attribute.value())),
                "type" => property_type = PropertyType::parse(attribute.value())?,
                "value" => raw_value = Some(attribute.value()),
                _ => {}
            }
        }

        // Multi-line strings are stored as element text
        let raw_value = raw_value.or_else(|| property_node.text());
        let value = match raw_value {
            Some(raw_value) => Some(PropertyValue::parse(property_type, raw_value)?),
            None => None,
        };
        Ok(Property { name, value })
    }
}

pub fn parse_properties(properties_node: Node) -> Result<Vec<Property>, ParseError> {
    properties_node
        .children()
        .filter(|node| node.has_tag_name("property"))
        .map(Property::parse)
        .collect()
}

fn parse_editor_settings(settings_node: Node) -> EditorSettings {
    let export = settings_node
        .children()
        .find(|node| node.has_tag_name("export"))
        .map(|export_node| Export {
            target: String::from(export_node.attribute("target").unwrap_or_default()),
            format: String::from(export_node.attribute("format").unwrap_or_default()),
        });
    EditorSettings { export }
}

fn parse_tile_offset(offset_node: Node) -> Result<TileOffset, ParseError> {
    let mut offset = TileOffset::default();
    for attribute in offset_node.attributes() {
        let name = attribute.name();
        let value = attribute.value();
        match name {
            "x" => offset.x = number(name, value)?,
            "y" => offset.y = number(name, value)?,
            _ => {}
        }
    }
    Ok(offset)
}

fn parse_grid(grid_node: Node) -> Result<Grid, ParseError> {
    let mut grid = Grid::default();
    for attribute in grid_node.attributes() {
        let name = attribute.name();
        let value = attribute.value();
        match name {
            "orientation" => grid.orientation = Orientation::parse(value)?,
            "width" => grid.width = number(name, value)?,
            "height" => grid.height = number(name, value)?,
            _ => {}
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod test {
    use roxmltree::Document;
    use crate::tileset::{ParseError, PropertyValue};
    use super::Tileset;

    #[test]
    fn raw_attributes_are_optional() {
        let doc = Document::parse(r#"<tileset name="bare"><tile id="2"/></tileset>"#).unwrap();
        let tileset = Tileset::parse_doc(&doc).unwrap();
        assert_eq!("bare", tileset.name);
        assert_eq!(None, tileset.tile_width);
        assert_eq!(None, tileset.image);
        assert_eq!(Some(2), tileset.tiles[0].id);
    }

    #[test]
    fn multiline_string_property() {
        let source = r#"<tileset>
 <properties>
  <property name="notes">first
second</property>
 </properties>
</tileset>"#;
        let doc = Document::parse(source).unwrap();
        let tileset = Tileset::parse_doc(&doc).unwrap();
        let notes = &tileset.properties[0];
        assert_eq!(Some("notes"), notes.name.as_deref());
        assert_eq!(Some(PropertyValue::String("first\nsecond".into())), notes.value);
    }

    #[test]
    fn wrong_root() {
        let doc = Document::parse(r#"<map width="2"/>"#).unwrap();
        let err = Tileset::parse_doc(&doc).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot { tag_name } if tag_name == "map"));
    }

    #[test]
    fn bad_number() {
        let doc = Document::parse(r#"<tileset tilewidth="wide"/>"#).unwrap();
        let err = Tileset::parse_doc(&doc).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { attribute, .. } if attribute == "tilewidth"));
    }
}
