use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::instrument;
use super::{
    parse, EditorSettings, Export, FillMode, Grid, ObjectAlignment, Orientation, ParseError,
    Properties, Property, PropertyType, PropertyValue, TileOffset, TileRenderSize, Tileset,
    TilesetError,
};

/// Tileset in the JSON layout Tiled exports.
#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonTileset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editorsettings: Option<JsonEditorSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<JsonGrid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imageheight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagewidth: Option<u32>,
    #[serde(default)]
    pub margin: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectalignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilerendersize: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fillmode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<JsonProperty>,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilecount: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tiledversion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileheight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileoffset: Option<JsonTileOffset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<JsonTile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilewidth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparentcolor: Option<String>,
    #[serde(rename = "type", default = "tileset_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
}

#[derive(Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonEditorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<JsonExport>,
}

#[derive(Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonExport {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub target: String,
}

#[derive(Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonGrid {
    pub orientation: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonTileOffset {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct JsonTile {
    pub id: u32,
    #[serde(rename = "type", alias = "class", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<JsonProperty>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct JsonProperty {
    pub name: String,
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,
    pub value: Value,
}

impl JsonProperty {

    /// Checks the JSON value against the declared type.
    pub fn to_value(&self) -> Result<PropertyValue, ParseError> {
        let mismatch = || ParseError::invalid_value(&self.name, &self.value.to_string());
        let value = match (self.property_type, &self.value) {
            (PropertyType::Bool, Value::Bool(value)) => PropertyValue::Bool(*value),
            (PropertyType::Int, Value::Number(value)) => PropertyValue::Int(value.as_i64().ok_or_else(mismatch)?),
            (PropertyType::Float, Value::Number(value)) => PropertyValue::Float(value.as_f64().ok_or_else(mismatch)?),
            (PropertyType::Object, Value::Number(value)) => {
                let id = value.as_u64().and_then(|id| u32::try_from(id).ok()).ok_or_else(mismatch)?;
                PropertyValue::Object(id)
            },
            (PropertyType::String, Value::String(value)) => PropertyValue::String(value.clone()),
            (PropertyType::File, Value::String(value)) => PropertyValue::File(value.clone()),
            (PropertyType::Color, Value::String(value)) => PropertyValue::Color(value.parse()?),
            _ => return Err(mismatch()),
        };
        Ok(value)
    }
}

impl From<&Property> for JsonProperty {
    fn from(property: &Property) -> Self {
        let value = match &property.value {
            PropertyValue::Bool(value) => Value::from(*value),
            PropertyValue::Int(value) => Value::from(*value),
            PropertyValue::Float(value) => Value::from(*value),
            PropertyValue::Object(value) => Value::from(*value),
            PropertyValue::String(value) | PropertyValue::File(value) => Value::from(value.as_str()),
            PropertyValue::Color(value) => Value::from(value.to_string()),
        };
        Self {
            name: property.name.clone(),
            property_type: property.property_type(),
            value,
        }
    }
}

impl From<&Tileset> for JsonTileset {
    fn from(tileset: &Tileset) -> Self {
        let non_default = |is_default: bool, value: &'static str| {
            (!is_default).then(|| String::from(value))
        };
        Self {
            columns: Some(tileset.columns),
            editorsettings: tileset.editor_settings.as_ref().map(|settings| JsonEditorSettings {
                export: settings.export.as_ref().map(|export| JsonExport {
                    format: export.format.clone(),
                    target: export.target.clone(),
                }),
            }),
            grid: tileset.grid.map(|grid| JsonGrid {
                orientation: String::from(grid.orientation.as_str()),
                width: grid.width,
                height: grid.height,
            }),
            image: Some(tileset.image.source.clone()),
            imageheight: tileset.image.height,
            imagewidth: tileset.image.width,
            margin: tileset.margin,
            name: tileset.name.clone(),
            class: tileset.class.clone(),
            objectalignment: non_default(
                tileset.object_alignment == ObjectAlignment::default(),
                tileset.object_alignment.as_str(),
            ),
            tilerendersize: non_default(
                tileset.tile_render_size == TileRenderSize::default(),
                tileset.tile_render_size.as_str(),
            ),
            fillmode: non_default(
                tileset.fill_mode == FillMode::default(),
                tileset.fill_mode.as_str(),
            ),
            properties: json_properties(&tileset.properties),
            spacing: tileset.spacing,
            tilecount: Some(tileset.tile_count),
            tiledversion: tileset.tiled_version.clone(),
            tileheight: Some(tileset.tile_height),
            tileoffset: tileset.tile_offset.map(|offset| JsonTileOffset { x: offset.x, y: offset.y }),
            tiles: tileset.tiles
                .iter()
                .map(|tile| JsonTile {
                    id: tile.id,
                    kind: tile.kind.clone(),
                    probability: tile.probability,
                    properties: json_properties(&tile.properties),
                })
                .collect(),
            tilewidth: Some(tileset.tile_width),
            transparentcolor: tileset.image.trans.clone(),
            kind: tileset_type(),
            version: tileset.version.clone(),
        }
    }
}

impl JsonTileset {

    /// Converts into the same raw form the XML reader produces,
    /// so both formats go through the same schema checks.
    pub fn into_parsed(self) -> Result<parse::Tileset, ParseError> {
        let image = match (self.image, self.imagewidth, self.imageheight) {
            (None, None, None) => None,
            (source, width, height) => Some(parse::Image {
                format: None,
                source,
                trans: self.transparentcolor,
                width,
                height,
            }),
        };
        let tiles = self.tiles
            .into_iter()
            .map(|tile| {
                Ok(parse::Tile {
                    id: Some(tile.id),
                    kind: tile.kind,
                    probability: tile.probability,
                    properties: parsed_properties(&tile.properties)?,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        let grid = match self.grid {
            Some(grid) => Some(Grid {
                orientation: Orientation::parse(&grid.orientation)?,
                width: grid.width,
                height: grid.height,
            }),
            None => None,
        };

        Ok(parse::Tileset {
            version: (!self.version.is_empty()).then_some(self.version),
            tiled_version: (!self.tiledversion.is_empty()).then_some(self.tiledversion),
            name: self.name,
            class: self.class,
            tile_width: self.tilewidth,
            tile_height: self.tileheight,
            spacing: self.spacing,
            margin: self.margin,
            tile_count: self.tilecount,
            columns: self.columns,
            object_alignment: self.objectalignment.as_deref().map(ObjectAlignment::parse).transpose()?.unwrap_or_default(),
            tile_render_size: self.tilerendersize.as_deref().map(TileRenderSize::parse).transpose()?.unwrap_or_default(),
            fill_mode: self.fillmode.as_deref().map(FillMode::parse).transpose()?.unwrap_or_default(),
            tile_offset: self.tileoffset.map(|offset| TileOffset { x: offset.x, y: offset.y }),
            grid,
            editor_settings: self.editorsettings.map(|settings| EditorSettings {
                export: settings.export.map(|export| Export {
                    target: export.target,
                    format: export.format,
                }),
            }),
            properties: parsed_properties(&self.properties)?,
            image,
            tiles,
        })
    }
}

impl Tileset {

    /// Parses a tileset in Tiled's JSON layout.
    #[instrument(skip_all)]
    pub fn from_json(source: &str) -> Result<Self, TilesetError> {
        let json: JsonTileset = serde_json::from_str(source)?;
        if json.kind != "tileset" {
            return Err(ParseError::invalid_value("type", &json.kind).into());
        }
        let parsed = json.into_parsed()?;
        Ok(Self::from_parsed(parsed)?)
    }
}

/// Writes a tileset in Tiled's JSON layout.
/// JSON has no NaN or infinity, so float properties holding them are an error.
#[instrument(skip_all)]
pub fn to_json(tileset: &Tileset) -> Result<String, TilesetError> {
    let properties = tileset.properties
        .iter()
        .chain(tileset.tiles.iter().flat_map(|tile| tile.properties.iter()));
    for property in properties {
        if let PropertyValue::Float(value) = property.value {
            if !value.is_finite() {
                return Err(TilesetError::NonFiniteFloat { name: property.name.clone() });
            }
        }
    }
    let json = JsonTileset::from(tileset);
    Ok(serde_json::to_string_pretty(&json)?)
}

fn json_properties(properties: &Properties) -> Vec<JsonProperty> {
    properties.iter().map(JsonProperty::from).collect()
}

pub(crate) fn parsed_properties(properties: &[JsonProperty]) -> Result<Vec<parse::Property>, ParseError> {
    properties
        .iter()
        .map(|property| Ok(parse::Property {
            name: Some(property.name.clone()),
            value: Some(property.to_value()?),
        }))
        .collect()
}

fn tileset_type() -> String {
    String::from("tileset")
}

/// Tiled wrote the format version as a number up to 1.5 and as a string afterwards.
pub(crate) fn version_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(f64),
    }
    let version = match Version::deserialize(deserializer)? {
        Version::Text(text) => text,
        Version::Number(number) => number.to_string(),
    };
    Ok(version)
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use crate::tileset::{PropertyValue, SchemaError, Tile, TilesetError};
    use super::{to_json, Tileset};

    const CLASSIC: &str = include_str!("../../assets/tileset_classic.tsx");

    #[test]
    fn export_layout() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let exported: serde_json::Value = serde_json::from_str(&to_json(&tileset).unwrap()).unwrap();
        assert_eq!(json!(8), exported["columns"]);
        assert_eq!(json!("tileset_classic.png"), exported["image"]);
        assert_eq!(json!(256), exported["imagewidth"]);
        assert_eq!(json!(64), exported["tilecount"]);
        assert_eq!(json!("tileset"), exported["type"]);
        assert_eq!(json!("1.2"), exported["version"]);
        assert_eq!(
            json!({
                "id": 1,
                "type": "block",
                "properties": [
                    { "name": "blocking", "type": "bool", "value": true },
                    { "name": "destroyable", "type": "bool", "value": true },
                ],
            }),
            exported["tiles"][1],
        );
        assert_eq!(json!({ "id": 3, "type": "block" }), exported["tiles"][3]);
    }

    #[test]
    fn json_round_trip() {
        let tileset = Tileset::parse_str(CLASSIC).unwrap();
        let exported = to_json(&tileset).unwrap();
        assert_eq!(tileset, Tileset::from_json(&exported).unwrap());
    }

    #[test]
    fn numeric_version() {
        let source = r#"{
            "columns": 1, "image": "a.png", "imagewidth": 16, "imageheight": 16,
            "tilecount": 1, "tilewidth": 16, "tileheight": 16,
            "type": "tileset", "version": 1.2
        }"#;
        let tileset = Tileset::from_json(source).unwrap();
        assert_eq!("1.2", tileset.version);
    }

    #[test]
    fn missing_tile_size() {
        let source = r#"{ "columns": 1, "image": "a.png", "tilecount": 1, "tileheight": 16 }"#;
        let err = Tileset::from_json(source).unwrap_err();
        assert!(matches!(
            err,
            TilesetError::Schema(SchemaError::MissingAttribute { attribute: "tilewidth", .. })
        ));
    }

    #[test]
    fn mistyped_property() {
        let source = r#"{
            "columns": 1, "image": "a.png", "tilecount": 1, "tilewidth": 16, "tileheight": 16,
            "tiles": [{ "id": 0, "properties": [{ "name": "blocking", "type": "bool", "value": "yes" }] }]
        }"#;
        let err = Tileset::from_json(source).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn class_names_the_tile_kind() {
        let source = r#"{
            "columns": 1, "image": "a.png", "tilecount": 1, "tilewidth": 16, "tileheight": 16,
            "tiles": [{ "id": 0, "class": "wall" }]
        }"#;
        let tileset = Tileset::from_json(source).unwrap();
        assert_eq!("wall", tileset.tiles[0].kind);
    }

    #[test]
    fn non_finite_floats_are_not_exported() {
        let mut tileset = Tileset::parse_str(CLASSIC).unwrap();
        tileset.tiles.push(Tile::new(9, "").with_property("speed", PropertyValue::Float(f64::NAN)));
        let err = to_json(&tileset).unwrap_err();
        assert!(matches!(err, TilesetError::NonFiniteFloat { ref name } if name == "speed"));

        tileset.tiles.pop();
        tileset.properties = [crate::tileset::Property::new("scale", PropertyValue::Float(f64::INFINITY))]
            .into_iter()
            .collect();
        assert!(matches!(to_json(&tileset), Err(TilesetError::NonFiniteFloat { .. })));
    }
}
