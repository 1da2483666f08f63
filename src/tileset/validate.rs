use std::path::Path;
use derive_more::Display;
use glam::UVec2;
use tracing::instrument;
use crate::{AssetManager, Config, HashSet};
use super::{Properties, PropertyType, Tileset};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Severity {
    #[display(fmt="warning")]
    Warning,
    #[display(fmt="error")]
    Error,
}

/// What a property issue is attached to.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Owner {
    #[display(fmt="tileset")]
    Tileset,
    #[display(fmt="tile {_0}")]
    Tile(u32),
}

/// A single problem found in a tileset.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
pub enum ValidationIssue {
    #[display(fmt="duplicate tile id {id}")]
    DuplicateTile { id: u32 },
    #[display(fmt="tile id {id} is outside of [0, {tile_count})")]
    TileOutOfRange { id: u32, tile_count: u32 },
    #[display(fmt="tileset has no columns")]
    NoColumns,
    #[display(fmt="tile grid is too large for any image")]
    GridTooLarge,
    #[display(fmt="image is declared {}x{} but the tile grid needs {}x{}", "declared.x", "declared.y", "expected.x", "expected.y")]
    ImageSizeMismatch { declared: UVec2, expected: UVec2 },
    #[display(fmt="{owner} has property '{name}' more than once")]
    DuplicateProperty { owner: Owner, name: String },
    #[display(fmt="{owner} property '{name}' is {found}, expected {expected}")]
    PropertyTypeMismatch { owner: Owner, name: String, expected: PropertyType, found: PropertyType },
    #[display(fmt="{owner} property '{name}' is not declared")]
    UndeclaredProperty { owner: Owner, name: String },
    #[display(fmt="image {path} could not be read: {reason}")]
    ImageUnreadable { path: String, reason: String },
    #[display(fmt="image {path} is {}x{} but declared {}x{}", "actual.x", "actual.y", "declared.x", "declared.y")]
    ImageFileMismatch { path: String, declared: UVec2, actual: UVec2 },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UndeclaredProperty { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

/// Checks a tileset's internal consistency.
/// Does not touch the file system.
#[instrument(skip_all)]
pub fn validate(tileset: &Tileset, config: &Config) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // Tile ids
    let mut seen = HashSet::default();
    for tile in &tileset.tiles {
        if !seen.insert(tile.id) {
            issues.push(ValidationIssue::DuplicateTile { id: tile.id });
        }
        if tile.id >= tileset.tile_count {
            issues.push(ValidationIssue::TileOutOfRange { id: tile.id, tile_count: tileset.tile_count });
        }
    }

    // Image size vs grid
    if tileset.columns == 0 {
        issues.push(ValidationIssue::NoColumns);
    }
    else {
        match (tileset.declared_image_size(), tileset.expected_image_size()) {
            (_, None) => issues.push(ValidationIssue::GridTooLarge),
            (Some(declared), Some(expected)) if declared != expected => {
                issues.push(ValidationIssue::ImageSizeMismatch { declared, expected });
            },
            _ => {}
        }
    }

    // Properties
    check_properties(Owner::Tileset, &tileset.properties, config, &mut issues);
    for tile in &tileset.tiles {
        check_properties(Owner::Tile(tile.id), &tile.properties, config, &mut issues);
    }

    for issue in &issues {
        log::debug!("{}: {issue}", tileset.name);
    }
    issues
}

/// Validates, and additionally compares the sheet image on disk with the declared size
/// when the config asks for it.
pub fn validate_in(tileset: &Tileset, config: &Config, base_dir: impl AsRef<Path>) -> Vec<ValidationIssue> {
    let mut issues = validate(tileset, config);
    if config.check_image {
        issues.extend(check_image(tileset, base_dir));
    }
    issues
}

/// Loads a tileset through the manager and validates it.
/// The sheet image is looked up next to the tileset.
pub fn validate_file(manager: &AssetManager, config: &Config, path: &str) -> anyhow::Result<Vec<ValidationIssue>> {
    let path = manager.parse_path(path)?;
    let tileset = manager.load_path::<Tileset>(&path)?;
    let base_dir = path.parent().unwrap_or_default();
    Ok(validate_in(&tileset, config, base_dir))
}

/// True if any issue is an error. Warnings alone don't fail a tileset.
pub fn any_errors<'a>(issues: impl IntoIterator<Item = &'a ValidationIssue>) -> bool {
    issues.into_iter().any(ValidationIssue::is_error)
}

/// Reads the real size of the sheet image and compares it to the declared size.
pub fn check_image(tileset: &Tileset, base_dir: impl AsRef<Path>) -> Option<ValidationIssue> {
    let path = tileset.image_path(base_dir);
    let path_string = path.display().to_string();
    let (width, height) = match image::image_dimensions(&path) {
        Ok(dimensions) => dimensions,
        Err(err) => return Some(ValidationIssue::ImageUnreadable {
            path: path_string,
            reason: err.to_string(),
        }),
    };
    let actual = UVec2::new(width, height);
    let declared = tileset.declared_image_size()?;
    if actual != declared {
        return Some(ValidationIssue::ImageFileMismatch { path: path_string, declared, actual });
    }
    None
}

fn check_properties(owner: Owner, properties: &Properties, config: &Config, issues: &mut Vec<ValidationIssue>) {
    let mut names = HashSet::default();
    for property in properties {
        if !names.insert(property.name.as_str()) {
            issues.push(ValidationIssue::DuplicateProperty { owner, name: property.name.clone() });
        }
        match config.declared_type(&property.name) {
            Some(expected) if expected != property.property_type() => {
                issues.push(ValidationIssue::PropertyTypeMismatch {
                    owner,
                    name: property.name.clone(),
                    expected,
                    found: property.property_type(),
                });
            },
            None if config.strict => {
                issues.push(ValidationIssue::UndeclaredProperty { owner, name: property.name.clone() });
            },
            _ => {}
        }
    }
}
