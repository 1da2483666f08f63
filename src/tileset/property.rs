use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::ParseError;

/// Declared type of a [`Property`].
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Color,
    File,
    Object,
}

impl PropertyType {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "color" => Ok(Self::Color),
            "file" => Ok(Self::File),
            "object" => Ok(Self::Object),
            _ => Err(ParseError::UnknownPropertyType { type_name: String::from(str) }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Color => "color",
            Self::File => "file",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARGB color as stored by Tiled ("#rrggbb" or "#aarrggbb").
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { alpha: 255, red, green, blue }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let err = || ParseError::InvalidColor { value: String::from(s) };
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i+2], 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                alpha: byte(0)?,
                red: byte(2)?,
                green: byte(4)?,
                blue: byte(6)?,
            }),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
        else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.alpha, self.red, self.green, self.blue)
        }
    }
}

/// Typed value of a [`Property`].
#[derive(Clone, PartialEq, Debug)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Color(Color),
    File(String),
    Object(u32),
}

impl PropertyValue {

    /// Parses the textual form of a value with the declared type.
    pub fn parse(property_type: PropertyType, value: &str) -> Result<Self, ParseError> {
        let invalid_number = || ParseError::InvalidNumber {
            attribute: String::from("value"),
            value: String::from(value),
        };
        let parsed = match property_type {
            PropertyType::String => Self::String(String::from(value)),
            PropertyType::File => Self::File(String::from(value)),
            PropertyType::Int => Self::Int(value.parse().map_err(|_| invalid_number())?),
            PropertyType::Float => Self::Float(value.parse().map_err(|_| invalid_number())?),
            PropertyType::Object => Self::Object(value.parse().map_err(|_| invalid_number())?),
            PropertyType::Color => Self::Color(value.parse()?),
            PropertyType::Bool => Self::Bool(parse_bool("value", value)?),
        };
        Ok(parsed)
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::String(_) => PropertyType::String,
            Self::Int(_) => PropertyType::Int,
            Self::Float(_) => PropertyType::Float,
            Self::Bool(_) => PropertyType::Bool,
            Self::Color(_) => PropertyType::Color,
            Self::File(_) => PropertyType::File,
            Self::Object(_) => PropertyType::Object,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::File(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) | Self::File(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Color(value) => write!(f, "{value}"),
            Self::Object(value) => write!(f, "{value}"),
        }
    }
}

/// Tiled only ever writes "true" and "false".
pub(crate) fn parse_bool(attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidBool {
            attribute: String::from(attribute),
            value: String::from(value),
        }),
    }
}

/// Named, typed metadata entry.
#[derive(Clone, PartialEq, Debug)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self { name: name.into(), value }
    }

    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }
}

/// Properties in document order.
/// Tiles rarely carry more than a handful, so they're stored inline.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Properties(SmallVec<[Property; 4]>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// First property with the name given.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|property| property.name == name)
            .map(|property| &property.value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.push(Property::new(name, value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::{Color, Properties, PropertyType, PropertyValue};

    #[test]
    fn parse_typed_values() {
        assert_eq!(PropertyValue::Bool(true), PropertyValue::parse(PropertyType::Bool, "true").unwrap());
        assert_eq!(PropertyValue::Int(-3), PropertyValue::parse(PropertyType::Int, "-3").unwrap());
        assert_eq!(PropertyValue::Float(0.5), PropertyValue::parse(PropertyType::Float, "0.5").unwrap());
        assert_eq!(PropertyValue::Object(12), PropertyValue::parse(PropertyType::Object, "12").unwrap());
        assert!(PropertyValue::parse(PropertyType::Bool, "yes").is_err());
        assert!(PropertyValue::parse(PropertyType::Int, "1.5").is_err());
    }

    #[test]
    fn unknown_type() {
        assert!(PropertyType::parse("class").is_err());
        assert_eq!(PropertyType::Bool, PropertyType::parse("bool").unwrap());
    }

    #[test]
    fn color() {
        let opaque: Color = "#ff8000".parse().unwrap();
        assert_eq!(Color::rgb(255, 128, 0), opaque);
        assert_eq!("#ff8000", opaque.to_string());

        let translucent: Color = "#80ff8000".parse().unwrap();
        assert_eq!(128, translucent.alpha);
        assert_eq!("#80ff8000", translucent.to_string());

        assert!("#ff80".parse::<Color>().is_err());
        assert!("#gg8000".parse::<Color>().is_err());
    }

    #[test]
    fn lookup() {
        let properties = Properties::new()
            .with("blocking", PropertyValue::Bool(true))
            .with("label", PropertyValue::String("wall".into()));
        assert_eq!(Some(true), properties.get_bool("blocking"));
        assert_eq!(None, properties.get_bool("label"));
        assert_eq!(None, properties.get("destroyable"));
        assert_eq!(2, properties.len());
    }
}
