use std::str::Utf8Error;
use derive_more::*;

/// Raised when a document cannot be read as a tileset at all.
#[derive(Error, Display, From, Debug)]
pub enum ParseError {
    #[display(fmt="Malformed XML: {_0}")]
    Xml(roxmltree::Error),
    #[display(fmt="Expected root element <tileset>, found <{tag_name}>")]
    #[from(ignore)]
    UnexpectedRoot { tag_name: String },
    #[display(fmt="Attribute '{attribute}' is not a valid number: '{value}'")]
    #[from(ignore)]
    InvalidNumber { attribute: String, value: String },
    #[display(fmt="Attribute '{attribute}' is not a valid bool: '{value}'")]
    #[from(ignore)]
    InvalidBool { attribute: String, value: String },
    #[display(fmt="Invalid color '{value}'")]
    #[from(ignore)]
    InvalidColor { value: String },
    #[display(fmt="Unexpected value '{value}' for attribute '{attribute}'")]
    #[from(ignore)]
    InvalidAttributeValue { attribute: String, value: String },
    #[display(fmt="Unsupported property type '{type_name}'")]
    #[from(ignore)]
    UnknownPropertyType { type_name: String },
}

impl ParseError {
    pub(crate) fn invalid_value(attribute: &str, value: &str) -> Self {
        Self::InvalidAttributeValue {
            attribute: String::from(attribute),
            value: String::from(value),
        }
    }
}

/// Raised when a well-formed document lacks something a tileset requires.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum SchemaError {
    #[display(fmt="<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: &'static str, attribute: &'static str },
    #[display(fmt="<{parent}> is missing required element <{element}>")]
    MissingElement { parent: &'static str, element: &'static str },
    #[display(fmt="Property '{name}' has no value")]
    MissingValue { name: String },
    #[display(fmt="Attribute '{attribute}' is missing and can't be derived from the image size")]
    UnderivableCount { attribute: &'static str },
}

/// Any failure produced while reading, converting or writing a tileset.
#[derive(Error, Display, From, Debug)]
pub enum TilesetError {
    #[display(fmt="Parse error: {_0}")]
    Parse(ParseError),
    #[display(fmt="Schema error: {_0}")]
    Schema(SchemaError),
    #[display(fmt="{_0}")]
    Utf8(Utf8Error),
    #[display(fmt="I/O error: {_0}")]
    Io(std::io::Error),
    #[display(fmt="Failed to write XML: {_0}")]
    XmlWrite(xml::writer::Error),
    #[display(fmt="JSON error: {_0}")]
    Json(serde_json::Error),
    #[display(fmt="Property '{name}' is not a finite number and can't be written as JSON")]
    #[from(ignore)]
    NonFiniteFloat { name: String },
}

impl From<roxmltree::Error> for TilesetError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Parse(ParseError::Xml(err))
    }
}

impl TilesetError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}
