use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use crate::tileset::{
    parsed_properties, properties_from_parsed, version_string, JsonProperty, JsonTileset,
    Orientation, ParseError, Properties, Property, PropertyValue, Tileset,
};
use super::{decode_base64, Gid, MapError, RenderOrder, TileLayer, TileMap, TilesetEntry};

/// Map in the JSON layout Tiled exports.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct JsonMap {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub renderorder: Option<String>,
    #[serde(default)]
    pub infinite: bool,
    #[serde(default)]
    pub properties: JsonMapProperties,
    #[serde(default)]
    pub tilesets: Vec<JsonTilesetEntry>,
    #[serde(default)]
    pub layers: Vec<JsonLayer>,
    #[serde(default)]
    pub tiledversion: String,
    #[serde(rename = "type", default = "map_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
}

/// Tiled writes properties as a list. Older exports used a plain object of name to value.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum JsonMapProperties {
    List(Vec<JsonProperty>),
    Object(serde_json::Map<String, Value>),
}

impl Default for JsonMapProperties {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct JsonTilesetEntry {
    pub firstgid: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(flatten)]
    pub tileset: JsonTileset,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct JsonLayer {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Option<JsonLayerData>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
    #[serde(default)]
    pub properties: Vec<JsonProperty>,
}

/// Layer data, either as an array of gids or as an encoded string.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum JsonLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

impl JsonMapProperties {
    fn into_properties(self) -> Result<Properties, MapError> {
        match self {
            Self::List(properties) => Ok(properties_from_parsed(parsed_properties(&properties)?)?),
            Self::Object(object) => object
                .into_iter()
                .map(|(name, value)| {
                    let value = match value {
                        Value::Bool(value) => PropertyValue::Bool(value),
                        Value::String(value) => PropertyValue::String(value),
                        Value::Number(number) => match number.as_i64() {
                            Some(value) => PropertyValue::Int(value),
                            None => PropertyValue::Float(number.as_f64().unwrap_or_default()),
                        },
                        value => return Err(ParseError::invalid_value(&name, &value.to_string()).into()),
                    };
                    Ok(Property::new(name, value))
                })
                .collect(),
        }
    }
}

impl JsonLayer {
    fn into_layer(self) -> Result<TileLayer, MapError> {
        if let Some(compression) = self.compression.filter(|compression| !compression.is_empty()) {
            return Err(MapError::UnsupportedCompression { compression });
        }
        let data = match self.data {
            Some(JsonLayerData::Gids(gids)) => gids.into_iter().map(Gid).collect(),
            Some(JsonLayerData::Encoded(encoded)) => match self.encoding.as_deref() {
                None | Some("base64") => decode_base64(&encoded)?,
                Some(encoding) => return Err(MapError::UnsupportedEncoding { encoding: String::from(encoding) }),
            },
            None => Vec::new(),
        };
        let layer = TileLayer {
            name: self.name,
            width: self.width,
            height: self.height,
            properties: properties_from_parsed(parsed_properties(&self.properties)?)?,
            data,
        };
        layer.check_size()?;
        Ok(layer)
    }
}

impl JsonTilesetEntry {
    fn into_entry(self) -> Result<TilesetEntry, MapError> {
        let first_gid = self.firstgid;
        match self.source {
            Some(source) => Ok(TilesetEntry::External { first_gid, source }),
            None => {
                let tileset = Tileset::from_parsed(self.tileset.into_parsed()?)?;
                Ok(TilesetEntry::Internal { first_gid, tileset })
            },
        }
    }
}

impl TileMap {

    /// Parses a map in Tiled's JSON layout.
    /// Like the game these maps were made for, only maps with exactly one layer holding data are accepted.
    #[instrument(skip_all)]
    pub fn from_json(source: &str) -> Result<Self, MapError> {
        let json: JsonMap = serde_json::from_str(source)?;
        if json.kind != "map" {
            return Err(ParseError::invalid_value("type", &json.kind).into());
        }
        if json.infinite {
            return Err(MapError::Infinite);
        }
        let with_data = json.layers.iter().filter(|layer| layer.data.is_some()).count();
        if json.layers.len() != 1 || with_data != 1 {
            let count = if json.layers.len() == 1 { with_data } else { json.layers.len() };
            return Err(MapError::LayerCount { count });
        }

        let map = TileMap {
            version: json.version,
            tiled_version: json.tiledversion,
            orientation: json.orientation.as_deref().map(Orientation::parse).transpose()?.unwrap_or_default(),
            render_order: json.renderorder.as_deref().map(RenderOrder::parse).transpose()?.unwrap_or_default(),
            width: json.width,
            height: json.height,
            tile_width: json.tilewidth,
            tile_height: json.tileheight,
            infinite: json.infinite,
            properties: json.properties.into_properties()?,
            tilesets: json.tilesets
                .into_iter()
                .map(JsonTilesetEntry::into_entry)
                .collect::<Result<_, _>>()?,
            layers: json.layers
                .into_iter()
                .map(JsonLayer::into_layer)
                .collect::<Result<_, _>>()?,
        };
        log::debug!("Parsed {}x{} JSON map", map.width, map.height);
        Ok(map)
    }
}

fn map_type() -> String {
    String::from("map")
}
