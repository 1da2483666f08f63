use super::{Properties, PropertyValue};

#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tile {
    /// ID of tile local to its tileset
    pub id: u32,
    /// Written as "type" by older editors and "class" by newer ones.
    pub kind: String,
    pub probability: Option<f32>,
    pub properties: Properties,
}

impl Tile {
    pub fn new(id: u32, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.push(super::Property::new(name, value));
        self
    }

    /// Value of a bool property, false when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.properties.get_bool(name).unwrap_or(false)
    }
}
