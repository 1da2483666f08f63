use std::io::Write;
use tracing::instrument;
use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};
use super::{
    FillMode, ObjectAlignment, Properties, PropertyType, PropertyValue, Tile, TileRenderSize,
    Tileset, TilesetError,
};

type Attributes = Vec<(&'static str, String)>;

/// Writes a tileset as a .tsx document.
#[instrument(skip_all)]
pub fn write_tsx(tileset: &Tileset) -> Result<String, TilesetError> {
    let mut bytes = Vec::new();
    write_tsx_to(tileset, &mut bytes)?;
    let xml = String::from_utf8(bytes).map_err(|err| err.utf8_error())?;
    Ok(xml)
}

/// Writes a tileset as a .tsx document to the writer given.
pub fn write_tsx_to<W: Write>(tileset: &Tileset, sink: W) -> Result<(), TilesetError> {
    let mut config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string(" ");
    config.perform_escaping = false;
    let mut writer = config.create_writer(sink);
    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;

    start(&mut writer, "tileset", &tileset_attributes(tileset))?;
    if let Some(settings) = &tileset.editor_settings {
        start(&mut writer, "editorsettings", &Vec::new())?;
        if let Some(export) = &settings.export {
            let attributes = vec![
                ("target", export.target.clone()),
                ("format", export.format.clone()),
            ];
            empty(&mut writer, "export", &attributes)?;
        }
        end(&mut writer)?;
    }
    if let Some(offset) = &tileset.tile_offset {
        empty(&mut writer, "tileoffset", &vec![("x", offset.x.to_string()), ("y", offset.y.to_string())])?;
    }
    if let Some(grid) = &tileset.grid {
        let attributes = vec![
            ("orientation", String::from(grid.orientation.as_str())),
            ("width", grid.width.to_string()),
            ("height", grid.height.to_string()),
        ];
        empty(&mut writer, "grid", &attributes)?;
    }
    write_properties(&mut writer, &tileset.properties)?;
    empty(&mut writer, "image", &image_attributes(tileset))?;
    for tile in &tileset.tiles {
        write_tile(&mut writer, tile)?;
    }
    end(&mut writer)?;

    let sink = writer.inner_mut();
    sink.write_all(b"\n")?;
    Ok(())
}

fn tileset_attributes(tileset: &Tileset) -> Attributes {
    let mut attributes = Attributes::new();
    if !tileset.version.is_empty() {
        attributes.push(("version", tileset.version.clone()));
    }
    if !tileset.tiled_version.is_empty() {
        attributes.push(("tiledversion", tileset.tiled_version.clone()));
    }
    attributes.push(("name", tileset.name.clone()));
    if !tileset.class.is_empty() {
        attributes.push(("class", tileset.class.clone()));
    }
    attributes.push(("tilewidth", tileset.tile_width.to_string()));
    attributes.push(("tileheight", tileset.tile_height.to_string()));
    if tileset.spacing != 0 {
        attributes.push(("spacing", tileset.spacing.to_string()));
    }
    if tileset.margin != 0 {
        attributes.push(("margin", tileset.margin.to_string()));
    }
    attributes.push(("tilecount", tileset.tile_count.to_string()));
    attributes.push(("columns", tileset.columns.to_string()));
    if tileset.object_alignment != ObjectAlignment::default() {
        attributes.push(("objectalignment", String::from(tileset.object_alignment.as_str())));
    }
    if tileset.tile_render_size != TileRenderSize::default() {
        attributes.push(("tilerendersize", String::from(tileset.tile_render_size.as_str())));
    }
    if tileset.fill_mode != FillMode::default() {
        attributes.push(("fillmode", String::from(tileset.fill_mode.as_str())));
    }
    attributes
}

fn image_attributes(tileset: &Tileset) -> Attributes {
    let image = &tileset.image;
    let mut attributes = Attributes::new();
    if let Some(format) = &image.format {
        attributes.push(("format", format.clone()));
    }
    attributes.push(("source", image.source.clone()));
    if let Some(trans) = &image.trans {
        attributes.push(("trans", trans.clone()));
    }
    if let Some(width) = image.width {
        attributes.push(("width", width.to_string()));
    }
    if let Some(height) = image.height {
        attributes.push(("height", height.to_string()));
    }
    attributes
}

fn write_tile<W: Write>(writer: &mut EventWriter<W>, tile: &Tile) -> Result<(), TilesetError> {
    let mut attributes = vec![("id", tile.id.to_string())];
    if !tile.kind.is_empty() {
        attributes.push(("type", tile.kind.clone()));
    }
    if let Some(probability) = tile.probability {
        attributes.push(("probability", probability.to_string()));
    }
    start(writer, "tile", &attributes)?;
    write_properties(writer, &tile.properties)?;
    end(writer)
}

fn write_properties<W: Write>(writer: &mut EventWriter<W>, properties: &Properties) -> Result<(), TilesetError> {
    if properties.is_empty() {
        return Ok(());
    }
    start(writer, "properties", &Vec::new())?;
    for property in properties {
        let mut attributes = vec![("name", property.name.clone())];
        if property.property_type() != PropertyType::String {
            attributes.push(("type", String::from(property.property_type().as_str())));
        }
        match &property.value {
            // Multi-line strings go in the element body
            PropertyValue::String(text) if text.contains('\n') => {
                start(writer, "property", &attributes)?;
                writer.write(XmlEvent::characters(&escape(text, false)))?;
                end(writer)?;
            },
            value => {
                attributes.push(("value", value.to_string()));
                empty(writer, "property", &attributes)?;
            },
        }
    }
    end(writer)
}

fn start<W: Write>(writer: &mut EventWriter<W>, name: &str, attributes: &Attributes) -> Result<(), TilesetError> {
    let escaped: Vec<String> = attributes.iter().map(|(_, value)| escape(value, true)).collect();
    let mut element = XmlEvent::start_element(name);
    for ((key, _), value) in attributes.iter().zip(&escaped) {
        element = element.attr(*key, value);
    }
    writer.write(element)?;
    Ok(())
}

fn end<W: Write>(writer: &mut EventWriter<W>) -> Result<(), TilesetError> {
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

/// Escapes markup characters.
/// Carriage returns, and in attributes tabs and newlines too, become character references
/// so that readers don't normalize them away.
fn escape(value: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for char in value.chars() {
        match char {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\'' if in_attribute => escaped.push_str("&apos;"),
            '\t' if in_attribute => escaped.push_str("&#9;"),
            '\n' if in_attribute => escaped.push_str("&#10;"),
            _ => escaped.push(char),
        }
    }
    escaped
}

/// Element without children. Written as <name .../>.
fn empty<W: Write>(writer: &mut EventWriter<W>, name: &str, attributes: &Attributes) -> Result<(), TilesetError> {
    start(writer, name, attributes)?;
    end(writer)
}

#[cfg(test)]
mod test {
    use crate::tileset::{
        EditorSettings, Export, Grid, Orientation, PropertyValue, Tile, TileOffset, Tileset,
        TilesetImage,
    };
    use super::{escape, write_tsx};

    const CLASSIC: &str = include_str!("../../assets/tileset_classic.tsx");

    #[test]
    fn classic_round_trip() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let written = write_tsx(&tileset).unwrap();
        let reparsed = Tileset::parse_str(&written).unwrap();
        assert_eq!(tileset, reparsed);

        // Writing again gives the exact same text
        assert_eq!(written, write_tsx(&reparsed).unwrap());
    }

    #[test]
    fn written_structure() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let written = write_tsx(&tileset).unwrap();
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(written.contains("tilewidth=\"32\""));
        assert!(written.contains("<export target=\"tileset_classic.json\" format=\"json\""));
        assert!(written.contains("name=\"destroyable\" type=\"bool\" value=\"true\""));
        assert!(!written.contains("spacing="));
    }

    #[test]
    fn every_field_round_trips() {
        let tileset = Tileset {
            version: String::from("1.10"),
            tiled_version: String::from("1.10.2"),
            name: String::from("custom & <odd>"),
            class: String::from("terrain"),
            tile_width: 16,
            tile_height: 24,
            spacing: 1,
            margin: 2,
            tile_count: 6,
            columns: 3,
            tile_offset: Some(TileOffset { x: -4, y: 8 }),
            grid: Some(Grid { orientation: Orientation::Isometric, width: 16, height: 8 }),
            editor_settings: Some(EditorSettings {
                export: Some(Export { target: String::from("out.json"), format: String::from("json") }),
            }),
            properties: [
                ("speed", PropertyValue::Float(1.5)),
                ("notes", PropertyValue::String(String::from("line one\nline two"))),
            ]
                .into_iter()
                .map(|(name, value)| crate::tileset::Property::new(name, value))
                .collect(),
            image: TilesetImage::new("sheets/custom.png", 54, 54),
            tiles: vec![
                Tile::new(0, "wall")
                    .with_property("blocking", PropertyValue::Bool(true))
                    .with_property("hp", PropertyValue::Int(3))
                    .with_property("tint", PropertyValue::Color("#80ff0000".parse().unwrap()))
                    .with_property("drop", PropertyValue::File(String::from("loot.tx")))
                    .with_property("link", PropertyValue::Object(7)),
                Tile { probability: Some(0.25), ..Tile::new(5, "") },
            ],
            ..Default::default()
        };
        let written = write_tsx(&tileset).unwrap();
        let reparsed = Tileset::parse_str(&written).unwrap();
        assert_eq!(tileset, reparsed);
    }

    #[test]
    fn escaping() {
        assert_eq!("a &amp; &lt;b&gt; &quot;c&quot; &apos;d&apos;", escape("a & <b> \"c\" 'd'", true));
        assert_eq!("x&#9;y&#13;&#10;z", escape("x\ty\r\nz", true));
        assert_eq!("x\ty&#13;\nz \"q\"", escape("x\ty\r\nz \"q\"", false));
    }

    #[test]
    fn whitespace_survives_writing() {
        let source = r#"<tileset name="tabs&#9;in&#9;name" tilewidth="16" tileheight="16" tilecount="1" columns="1">
 <image source="a.png" width="16" height="16"/>
 <tile id="0" type="a&#10;b">
  <properties>
   <property name="tab" value="x&#9;y"/>
   <property name="crlf" value="l1&#13;&#10;l2"/>
   <property name="body">first&#13;
second</property>
  </properties>
 </tile>
</tileset>"#;
        let tileset = Tileset::parse_str(source).unwrap();
        let tile = tileset.tile(0).unwrap();
        assert_eq!("tabs\tin\tname", tileset.name);
        assert_eq!("a\nb", tile.kind);
        assert_eq!(Some(&PropertyValue::String(String::from("x\ty"))), tile.properties.get("tab"));
        assert_eq!(Some(&PropertyValue::String(String::from("l1\r\nl2"))), tile.properties.get("crlf"));
        assert_eq!(Some(&PropertyValue::String(String::from("first\r\nsecond"))), tile.properties.get("body"));

        let written = write_tsx(&tileset).unwrap();
        let reparsed = Tileset::parse_str(&written).unwrap();
        assert_eq!(tileset, reparsed);
        assert_eq!(written, write_tsx(&reparsed).unwrap());
    }
}
