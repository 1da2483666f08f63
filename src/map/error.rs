use std::str::Utf8Error;
use derive_more::*;
use crate::tileset::{ParseError, SchemaError};

/// Any failure produced while reading a map.
#[derive(Error, Display, From, Debug)]
pub enum MapError {
    #[display(fmt="Malformed XML: {_0}")]
    Xml(roxmltree::Error),
    #[display(fmt="{_0}")]
    Utf8(Utf8Error),
    #[display(fmt="JSON error: {_0}")]
    Json(serde_json::Error),
    #[display(fmt="{_0}")]
    Parse(ParseError),
    #[display(fmt="Embedded tileset: {_0}")]
    Schema(SchemaError),
    #[display(fmt="Invalid base64 layer data: {_0}")]
    Base64(base64::DecodeError),
    #[display(fmt="Expected root element <map>, found <{tag_name}>")]
    #[from(ignore)]
    UnexpectedRoot { tag_name: String },
    #[display(fmt="<{element}> is missing required attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { element: &'static str, attribute: &'static str },
    #[display(fmt="Unsupported layer encoding '{encoding}'")]
    #[from(ignore)]
    UnsupportedEncoding { encoding: String },
    #[display(fmt="Compressed layer data is not supported ({compression})")]
    #[from(ignore)]
    UnsupportedCompression { compression: String },
    #[display(fmt="Infinite maps are not supported")]
    #[from(ignore)]
    Infinite,
    #[display(fmt="Invalid tile id '{value}' in layer data")]
    #[from(ignore)]
    InvalidGid { value: String },
    #[display(fmt="Layer '{name}' has {found} tiles, expected {expected}")]
    #[from(ignore)]
    LayerSizeMismatch { name: String, expected: usize, found: usize },
    #[display(fmt="Not a valid map: expected exactly one tile layer with data, found {count}")]
    #[from(ignore)]
    LayerCount { count: usize },
}
