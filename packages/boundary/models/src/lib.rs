#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Administrative region boundary types.
//!
//! A [`BoundaryCollection`] is the parsed form of a boundary file. The
//! property that holds each region's name is resolved once for the whole
//! collection and stored as its [`NameAttribute`].

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// A boundary file definition, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryDefinition {
    /// Unique identifier (e.g., `"jabar_kabupaten"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// `GeoJSON` file path. Relative paths resolve against the data
    /// directory.
    pub file: String,
    /// Property names that may hold the region name, most preferred first.
    pub name_candidates: Vec<String>,
    /// Property used when none of the candidates exist.
    pub fallback_name: String,
}

impl BoundaryDefinition {
    /// Returns the definition identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How the collection's name attribute was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NameResolution {
    /// A candidate from the preference list exists in the schema.
    Detected,
    /// No candidate matched, so the fallback name is used. The fallback may
    /// not exist either, in which case every region name is empty.
    Fallback,
}

/// The property chosen as the canonical region name for a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAttribute {
    /// Property name.
    pub name: String,
    /// How it was chosen.
    pub resolution: NameResolution,
}

/// One administrative region polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    /// Value of the collection's name attribute for this feature, in text
    /// form. Empty when the feature lacks the attribute.
    pub name: String,
    /// Region geometry. Single polygons are wrapped in a multipolygon.
    pub geometry: MultiPolygon<f64>,
    /// All feature properties, passed through untouched.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A parsed boundary file.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCollection {
    /// Regions in file order.
    pub regions: Vec<RegionBoundary>,
    /// Property every region's `name` was read from.
    pub name_attribute: NameAttribute,
}

impl BoundaryCollection {
    /// Creates an empty collection, used when the boundary file is missing.
    #[must_use]
    pub fn empty(fallback_name: &str) -> Self {
        Self {
            regions: Vec::new(),
            name_attribute: NameAttribute {
                name: fallback_name.to_string(),
                resolution: NameResolution::Fallback,
            },
        }
    }

    /// Returns `true` if the collection has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns the number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }
}
