#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Statistical record, dataset, and source definition types.
//!
//! A [`Dataset`] is produced once per acquisition attempt and is never
//! mutated afterwards. Its [`Provenance`] tells the presentation layer
//! whether the numbers are live, cached, or missing entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Where a [`Dataset`] came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    /// Fetched from the live remote endpoint.
    Remote,
    /// Read from the local cache file after the remote path failed.
    Cached,
    /// Neither the remote endpoint nor the cache file produced data.
    Absent,
}

/// One row of the statistical dataset after value coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Region label exactly as the source spells it (e.g. `"KOTA BANDUNG"`).
    pub region: String,
    /// Reporting year. `None` when the source value is missing or not an
    /// integer.
    pub period: Option<i32>,
    /// Category label (e.g. `"DISABILITAS FISIK"`).
    pub category: String,
    /// Parsed value. Always finite and non-negative when present.
    pub value: Option<f64>,
}

impl Record {
    /// Returns the value, treating an absent value as zero.
    #[must_use]
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// An ordered collection of [`Record`]s tagged with its [`Provenance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Records in source order.
    pub records: Vec<Record>,
    /// Where the records came from.
    pub provenance: Provenance,
    /// When the acquisition that produced this dataset finished.
    pub acquired_at: DateTime<Utc>,
    /// Why the remote path was not used. `None` for [`Provenance::Remote`].
    pub fallback_reason: Option<String>,
}

impl Dataset {
    /// Creates a dataset fetched from the remote endpoint.
    #[must_use]
    pub fn remote(records: Vec<Record>) -> Self {
        Self {
            records,
            provenance: Provenance::Remote,
            acquired_at: Utc::now(),
            fallback_reason: None,
        }
    }

    /// Creates a dataset read from the local cache file.
    #[must_use]
    pub fn cached(records: Vec<Record>, fallback_reason: impl Into<String>) -> Self {
        Self {
            records,
            provenance: Provenance::Cached,
            acquired_at: Utc::now(),
            fallback_reason: Some(fallback_reason.into()),
        }
    }

    /// Creates an empty dataset for when no source produced data.
    #[must_use]
    pub fn absent(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            provenance: Provenance::Absent,
            acquired_at: Utc::now(),
            fallback_reason: Some(reason.into()),
        }
    }

    /// Returns `true` if the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the most recent reporting period present in the records.
    #[must_use]
    pub fn latest_period(&self) -> Option<i32> {
        self.records.iter().filter_map(|r| r.period).max()
    }
}

/// A statistical data source, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSourceDefinition {
    /// Unique source identifier (e.g., `"jabar_disability"`).
    pub id: String,
    /// Human-readable dataset title.
    pub name: String,
    /// Local cache file with the same `{"data": [...]}` shape as the
    /// remote body. Relative paths resolve against the data directory.
    pub cache_file: String,
    /// How long an acquired dataset stays fresh in memory, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Remote endpoint configuration.
    pub fetcher: RemoteFetcherConfig,
    /// Row field names.
    pub fields: RecordFieldMapping,
}

impl DatasetSourceDefinition {
    /// Returns the source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

const fn default_ttl_secs() -> u64 {
    3600
}

/// Remote endpoint and request identity for the two-step exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFetcherConfig {
    /// Data endpoint URL, without the `limit` query parameter.
    pub api_url: String,
    /// Value for the `limit` query parameter.
    pub limit: Option<u32>,
    /// Origin page requested first to pick up session cookies. Skipped when
    /// unset.
    pub warmup_url: Option<String>,
    /// Browser-like `User-Agent` header.
    pub user_agent: String,
    /// `Accept` header.
    #[serde(default = "default_accept")]
    pub accept: String,
    /// `Referer` header.
    pub referer: Option<String>,
    /// Timeout for the warm-up request, in seconds.
    #[serde(default = "default_warmup_timeout_secs")]
    pub warmup_timeout_secs: u64,
    /// Timeout for the data request, in seconds.
    #[serde(default = "default_data_timeout_secs")]
    pub data_timeout_secs: u64,
}

fn default_accept() -> String {
    "application/json".to_string()
}

const fn default_warmup_timeout_secs() -> u64 {
    10
}

const fn default_data_timeout_secs() -> u64 {
    15
}

/// Names of the row fields the source schema guarantees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFieldMapping {
    /// Region label field.
    pub region: String,
    /// Reporting period (year) field.
    pub period: String,
    /// Category label field.
    pub category: String,
    /// Numeric value field.
    pub value: String,
}
