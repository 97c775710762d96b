#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Administrative boundary loading.
//!
//! Reads a `GeoJSON` `FeatureCollection` of region polygons from local
//! storage, picks the property that carries the region name from an ordered
//! candidate list, and keeps the parsed collection in a [`cache::BoundaryCache`]
//! that is filled at most once per process.

pub mod cache;
pub mod geometry;
pub mod loader;
pub mod registry;

use thiserror::Error;

/// Errors that can occur while loading boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The boundary or definition file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The definition file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The `GeoJSON` parsed but is not usable as a boundary collection.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

