use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::tileset::PropertyType;

/// Settings for checking tilesets, read from a YAML file.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Warn about properties that aren't declared in `property_types`.
    pub strict: bool,
    /// Open the sheet image and compare its real size with the declared one.
    pub check_image: bool,
    pub property_types: Vec<PropertyDecl>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            check_image: false,
            property_types: vec![
                PropertyDecl::new("blocking", PropertyType::Bool),
                PropertyDecl::new("destroyable", PropertyType::Bool),
            ],
        }
    }
}

impl Config {

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&source)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Loads the config, falling back to the default one if it can't be read.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err:#}, using default config");
                Self::default()
            },
        }
    }

    /// Type declared for a property name, if any.
    pub fn declared_type(&self, name: &str) -> Option<PropertyType> {
        self.property_types
            .iter()
            .find(|decl| decl.name == name)
            .map(|decl| decl.property_type)
    }
}

/// Expected type of a named property.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self { name: name.into(), property_type }
    }
}
