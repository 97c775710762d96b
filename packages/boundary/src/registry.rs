//! Compile-time registry of boundary file definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! The first entry is the default.

use std::path::Path;
use std::sync::LazyLock;

use disability_map_boundary_models::BoundaryDefinition;

use crate::BoundaryError;

/// Embedded TOML boundary definitions.
const BOUNDARY_TOMLS: &[(&str, &str)] = &[(
    "jabar_kabupaten",
    include_str!("../sources/jabar_kabupaten.toml"),
)];

static DEFINITIONS: LazyLock<Vec<BoundaryDefinition>> = LazyLock::new(|| {
    BOUNDARY_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse boundary definition '{name}': {e}"))
        })
        .collect()
});

/// Returns all registered boundary definitions.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse.
#[must_use]
pub fn all_definitions() -> &'static [BoundaryDefinition] {
    &DEFINITIONS
}

/// Returns the default boundary definition.
///
/// # Panics
///
/// Panics if the registry is empty or fails to parse.
#[must_use]
pub fn default_definition() -> &'static BoundaryDefinition {
    &all_definitions()[0]
}

/// Looks up a registered definition by id.
#[must_use]
pub fn find_definition(id: &str) -> Option<&'static BoundaryDefinition> {
    all_definitions().iter().find(|d| d.id == id)
}

/// Loads a boundary definition from a TOML file on disk.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the file cannot be read or parsed.
pub fn load_definition(path: &Path) -> Result<BoundaryDefinition, BoundaryError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::de::from_str(&text)?)
}
