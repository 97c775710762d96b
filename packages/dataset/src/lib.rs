#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Statistical dataset acquisition.
//!
//! [`fetcher::SourceFetcher`] tries the remote endpoint first (a cookie
//! warm-up request followed by the data request) and falls back to a local
//! cache file. Failures on the remote path never reach the caller: they are
//! logged and recorded as the dataset's fallback reason. Only a
//! [`Provenance::Absent`](disability_map_dataset_models::Provenance::Absent)
//! dataset signals that nothing could be loaded.
//!
//! [`cache::DatasetCache`] keeps the last acquisition in memory for the
//! source's time-to-live.

pub mod cache;
pub mod fetcher;
pub mod parsing;
pub mod registry;

#[cfg(test)]
mod test_support;

use async_trait::async_trait;
use disability_map_dataset_models::Dataset;

/// Errors raised while acquiring a dataset.
///
/// These stay inside this crate: [`DatasetFetcher::fetch`] converts them
/// into a fallback instead of returning them.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading the cache file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body parsed as JSON but does not have the expected shape.
    #[error("Malformed body: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors raised while loading a source definition from disk.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// The definition file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The definition file is not valid TOML for a source definition.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Something that can produce a [`Dataset`].
///
/// `fetch` always returns a dataset; acquisition failures are expressed
/// through its provenance, not through an error.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Returns the identifier of the source being fetched.
    fn id(&self) -> &str;

    /// Runs one full acquisition attempt.
    async fn fetch(&self) -> Dataset;
}
