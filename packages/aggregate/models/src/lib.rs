#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregation result types.
//!
//! Everything here is read-only output handed to the presentation layer:
//! one [`AggregatedRegion`] per boundary, the headline [`KpiSummary`], and
//! the geometry-independent category and top-region summaries.

use std::collections::BTreeSet;

use disability_map_region::JoinKey;
use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Name reported as the top region when no group exists.
pub const NO_TOP_REGION: &str = "-";

/// A boundary enriched with the summed value of its matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRegion {
    /// Region name as read from the boundary's name attribute.
    pub name: String,
    /// Canonical key used for the join.
    pub join_key: JoinKey,
    /// Region geometry.
    pub geometry: MultiPolygon<f64>,
    /// Passthrough boundary properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Summed value of matching records, zero when nothing matched.
    pub value: f64,
    /// Number of matching records, including ones with an absent value.
    pub record_count: usize,
    /// Whether any record matched this region.
    pub matched: bool,
    /// Where a map label for this region should be anchored.
    pub label_point: Option<Point<f64>>,
}

/// Headline figures for the selected reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    /// Reporting period the figures cover.
    pub period: i32,
    /// Sum over every record in the period, matched to a boundary or not.
    pub total: f64,
    /// Join key of the highest-valued group, or [`NO_TOP_REGION`].
    pub top_name: String,
    /// Value of the highest-valued group, zero with the placeholder.
    pub top_value: f64,
}

impl KpiSummary {
    /// Returns `true` if `top_name` is a real group rather than the
    /// placeholder.
    #[must_use]
    pub fn has_top_region(&self) -> bool {
        self.top_name != NO_TOP_REGION
    }
}

/// Sum of values for one category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category label as spelled in the source.
    pub category: String,
    /// Summed value.
    pub total: f64,
}

/// Sum of values for one raw (not normalized) region label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTotal {
    /// Region label as spelled in the source.
    pub region: String,
    /// Summed value.
    pub total: f64,
}

/// Which side of the join a key collision was seen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CollisionSide {
    /// Several distinct record labels share the key; their values are summed.
    Records,
    /// Several boundaries share the key; each receives the full group sum.
    Boundaries,
}

/// Distinct labels that canonicalize to the same [`JoinKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCollision {
    /// The shared key.
    pub key: JoinKey,
    /// Where the collision happened.
    pub side: CollisionSide,
    /// The distinct raw labels, sorted.
    pub labels: BTreeSet<String>,
}

/// Full output of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Reporting period the records were filtered to.
    pub period: i32,
    /// One entry per input boundary, in boundary order.
    pub regions: Vec<AggregatedRegion>,
    /// Headline figures.
    pub kpi: KpiSummary,
    /// Per-category sums, ascending by total.
    pub categories: Vec<CategoryTotal>,
    /// Highest raw region labels, descending by total.
    pub top_regions: Vec<RegionTotal>,
    /// Record keys that matched no boundary, sorted.
    pub unmatched_keys: Vec<JoinKey>,
    /// Key collisions seen on either side of the join.
    pub collisions: Vec<KeyCollision>,
}

impl Aggregation {
    /// Sums the values of matched regions, counting each distinct join key
    /// once even when several boundaries share it.
    #[must_use]
    pub fn matched_total(&self) -> f64 {
        let mut seen = BTreeSet::new();
        self.regions
            .iter()
            .filter(|r| r.matched && seen.insert(&r.join_key))
            .map(|r| r.value)
            .sum()
    }

    /// Returns the number of regions that matched at least one record.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.regions.iter().filter(|r| r.matched).count()
    }
}
