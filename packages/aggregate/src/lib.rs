#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Joins statistical records onto region boundaries and summarizes them.
//!
//! [`aggregate`] keeps only the most recent reporting period, canonicalizes
//! region names on both sides with [`disability_map_region::normalize`],
//! sums values per join key, and left-joins the sums onto the boundaries.
//! Every boundary appears in the output exactly once; boundaries without a
//! matching record get a value of zero. A blank join key never matches
//! anything and is never reported as the top region.

use std::collections::{BTreeMap, BTreeSet};

use disability_map_aggregate_models::{
    AggregatedRegion, Aggregation, CategoryTotal, CollisionSide, KeyCollision, KpiSummary,
    NO_TOP_REGION, RegionTotal,
};
use disability_map_boundary::geometry::label_point;
use disability_map_boundary_models::BoundaryCollection;
use disability_map_dataset_models::{Dataset, Provenance, Record};
use disability_map_region::{JoinKey, normalize};

/// Number of entries kept in the top-region summary.
pub const TOP_REGION_LIMIT: usize = 10;

/// Why there is nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoDataReason {
    /// The dataset has no records at all.
    #[error("dataset is empty (provenance {provenance})")]
    EmptyDataset {
        /// Where the empty dataset came from.
        provenance: Provenance,
    },

    /// No record carries a usable reporting period.
    #[error("no record has a reporting period")]
    NoReportingPeriod,

    /// The boundary collection is empty, so no map can be drawn.
    #[error("boundary collection is empty")]
    NoBoundaries,
}

/// Errors that can occur during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// There is no data to aggregate. This is the only aggregation failure.
    #[error("No data: {0}")]
    NoData(#[from] NoDataReason),
}

#[derive(Default)]
struct Group {
    total: f64,
    record_count: usize,
    labels: BTreeSet<String>,
}

/// Aggregates `dataset` onto `boundaries`.
///
/// # Errors
///
/// Returns [`AggregateError::NoData`] if the dataset is empty, no record has
/// a reporting period, or there are no boundaries. Everything else degrades
/// to zero-filled regions or empty summaries.
pub fn aggregate(
    dataset: &Dataset,
    boundaries: &BoundaryCollection,
) -> Result<Aggregation, AggregateError> {
    if dataset.is_empty() {
        return Err(NoDataReason::EmptyDataset {
            provenance: dataset.provenance,
        }
        .into());
    }
    if boundaries.is_empty() {
        return Err(NoDataReason::NoBoundaries.into());
    }
    let period = dataset
        .latest_period()
        .ok_or(NoDataReason::NoReportingPeriod)?;

    let records: Vec<&Record> = dataset
        .records
        .iter()
        .filter(|r| r.period == Some(period))
        .collect();
    log::info!(
        "Aggregating {} of {} records for period {period}",
        records.len(),
        dataset.records.len()
    );

    let groups = group_by_join_key(&records);
    let mut collisions = record_collisions(&groups);

    let boundary_keys: Vec<JoinKey> = boundaries
        .regions
        .iter()
        .map(|b| normalize(&b.name))
        .collect();
    collisions.extend(boundary_collisions(boundaries, &boundary_keys));

    let regions: Vec<AggregatedRegion> = boundaries
        .regions
        .iter()
        .zip(boundary_keys)
        .map(|(boundary, join_key)| {
            // A blank key carries no region identity and never joins.
            let group = (!join_key.is_empty())
                .then(|| groups.get(&join_key))
                .flatten();
            AggregatedRegion {
                name: boundary.name.clone(),
                geometry: boundary.geometry.clone(),
                properties: boundary.properties.clone(),
                value: group.map_or(0.0, |g| g.total),
                record_count: group.map_or(0, |g| g.record_count),
                matched: group.is_some(),
                label_point: label_point(&boundary.geometry),
                join_key,
            }
        })
        .collect();

    let matched_keys: BTreeSet<&JoinKey> = regions
        .iter()
        .filter(|r| r.matched)
        .map(|r| &r.join_key)
        .collect();
    let unmatched_keys: Vec<JoinKey> = groups
        .keys()
        .filter(|k| !matched_keys.contains(k))
        .cloned()
        .collect();
    if !unmatched_keys.is_empty() {
        log::warn!(
            "{} record keys match no boundary: {}",
            unmatched_keys.len(),
            unmatched_keys
                .iter()
                .map(JoinKey::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let kpi = kpi_summary(period, &records, &groups);

    Ok(Aggregation {
        period,
        regions,
        kpi,
        categories: category_totals(&records),
        top_regions: top_regions(&records, TOP_REGION_LIMIT),
        unmatched_keys,
        collisions,
    })
}

/// Groups records by the canonical form of their region label.
fn group_by_join_key(records: &[&Record]) -> BTreeMap<JoinKey, Group> {
    let mut groups: BTreeMap<JoinKey, Group> = BTreeMap::new();
    for record in records {
        let group = groups.entry(normalize(&record.region)).or_default();
        group.total += record.value_or_zero();
        group.record_count += 1;
        group.labels.insert(record.region.clone());
    }
    groups
}

fn record_collisions(groups: &BTreeMap<JoinKey, Group>) -> Vec<KeyCollision> {
    groups
        .iter()
        .filter(|(_, g)| g.labels.len() > 1)
        .map(|(key, g)| {
            log::warn!(
                "Record labels {:?} share join key {key}; summing them together",
                g.labels
            );
            KeyCollision {
                key: key.clone(),
                side: CollisionSide::Records,
                labels: g.labels.clone(),
            }
        })
        .collect()
}

fn boundary_collisions(boundaries: &BoundaryCollection, keys: &[JoinKey]) -> Vec<KeyCollision> {
    let mut by_key: BTreeMap<&JoinKey, BTreeSet<String>> = BTreeMap::new();
    let mut counts: BTreeMap<&JoinKey, usize> = BTreeMap::new();
    for (boundary, key) in boundaries.regions.iter().zip(keys) {
        if key.is_empty() {
            continue;
        }
        by_key.entry(key).or_default().insert(boundary.name.clone());
        *counts.entry(key).or_default() += 1;
    }

    by_key
        .into_iter()
        .filter(|(key, _)| counts.get(key).copied().unwrap_or(0) > 1)
        .map(|(key, labels)| {
            log::warn!("Boundaries {labels:?} share join key {key}; each gets the full group sum");
            KeyCollision {
                key: key.clone(),
                side: CollisionSide::Boundaries,
                labels,
            }
        })
        .collect()
}

/// Total over the period plus the highest group.
///
/// Groups are visited in key order and sorted with a stable descending
/// sort, so ties go to the lexicographically smallest key.
fn kpi_summary(period: i32, records: &[&Record], groups: &BTreeMap<JoinKey, Group>) -> KpiSummary {
    let total = records.iter().map(|r| r.value_or_zero()).sum();

    let mut ranked: Vec<(&JoinKey, f64)> = groups
        .iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, g)| (k, g.total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (top_name, top_value) = ranked.first().map_or_else(
        || (NO_TOP_REGION.to_string(), 0.0),
        |(key, value)| (key.to_string(), *value),
    );

    KpiSummary {
        period,
        total,
        top_name,
        top_value,
    }
}

/// Sums values per category label, ascending by total.
fn category_totals(records: &[&Record]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.category.as_str()).or_default() += record.value_or_zero();
    }

    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    categories.sort_by(|a, b| a.total.total_cmp(&b.total));
    categories
}

/// Sums values per raw region label, descending by total, truncated to
/// `limit` entries.
fn top_regions(records: &[&Record], limit: usize) -> Vec<RegionTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.region.as_str()).or_default() += record.value_or_zero();
    }

    let mut regions: Vec<RegionTotal> = totals
        .into_iter()
        .map(|(region, total)| RegionTotal {
            region: region.to_string(),
            total,
        })
        .collect();
    regions.sort_by(|a, b| b.total.total_cmp(&a.total));
    regions.truncate(limit);
    regions
}
