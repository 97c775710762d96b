//! Compile-time registry of statistical dataset sources.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! The first entry is the default source.

use std::path::Path;
use std::sync::LazyLock;

use disability_map_dataset_models::DatasetSourceDefinition;

use crate::DefinitionError;

/// Embedded TOML source definitions.
const SOURCE_TOMLS: &[(&str, &str)] = &[(
    "jabar_disability",
    include_str!("../sources/jabar_disability.toml"),
)];

static SOURCES: LazyLock<Vec<DatasetSourceDefinition>> = LazyLock::new(|| {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset source '{name}': {e}"))
        })
        .collect()
});

/// Returns all registered dataset sources.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_sources() -> &'static [DatasetSourceDefinition] {
    &SOURCES
}

/// Returns the default dataset source.
///
/// # Panics
///
/// Panics if the registry is empty or fails to parse.
#[must_use]
pub fn default_source() -> &'static DatasetSourceDefinition {
    &all_sources()[0]
}

/// Looks up a registered source by id.
#[must_use]
pub fn find_source(id: &str) -> Option<&'static DatasetSourceDefinition> {
    all_sources().iter().find(|s| s.id == id)
}

/// Loads a source definition from a TOML file on disk.
///
/// # Errors
///
/// Returns [`DefinitionError`] if the file cannot be read or parsed.
pub fn load_definition(path: &Path) -> Result<DatasetSourceDefinition, DefinitionError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::de::from_str(&text)?)
}
