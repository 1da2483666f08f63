//! Structs defined here mirror those in [`crate::tileset`].
//! The main difference is that they're a 1:1 mapping of the tsx format
//! where every attribute is optional, so missing ones can be reported as schema errors later.
mod tileset;

pub use tileset::*;

use std::str::FromStr;
use crate::tileset::ParseError;

/// Parses a numeric attribute, keeping the attribute name for error reporting.
pub(crate) fn number<T: FromStr>(attribute: &str, value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        attribute: String::from(attribute),
        value: String::from(value),
    })
}
