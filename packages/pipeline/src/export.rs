//! `GeoJSON` export of an aggregation for external map renderers.
//!
//! Each [`AggregatedRegion`] becomes one feature whose properties are the
//! boundary's own properties plus:
//!
//! | Property | Value |
//! |---|---|
//! | `nama_join` | join key |
//! | `jumlah_penduduk` | summed value, zero when unmatched |
//! | `jumlah_record` | number of matching records |
//! | `matched` | whether any record matched |
//! | `label_point` | `[lon, lat]` label anchor, or `null` |
//!
//! Collection-level metadata (period, provenance, KPI) is written as
//! foreign members.

use std::path::Path;

use disability_map_aggregate_models::{AggregatedRegion, Aggregation};
use disability_map_dataset_models::Provenance;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};

use crate::PipelineError;

/// Property holding the join key.
pub const JOIN_KEY_PROPERTY: &str = "nama_join";

/// Property holding the summed value.
pub const VALUE_PROPERTY: &str = "jumlah_penduduk";

/// Builds the feature for one region.
#[must_use]
pub fn region_feature(region: &AggregatedRegion) -> Feature {
    let mut properties: JsonObject = region.properties.clone();
    properties.insert(
        JOIN_KEY_PROPERTY.to_string(),
        serde_json::json!(region.join_key.as_str()),
    );
    properties.insert(VALUE_PROPERTY.to_string(), serde_json::json!(region.value));
    properties.insert(
        "jumlah_record".to_string(),
        serde_json::json!(region.record_count),
    );
    properties.insert("matched".to_string(), serde_json::json!(region.matched));
    properties.insert(
        "label_point".to_string(),
        region
            .label_point
            .map_or(serde_json::Value::Null, |p| serde_json::json!([p.x(), p.y()])),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&region.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds a `FeatureCollection` with one feature per region, in region
/// order.
#[must_use]
pub fn feature_collection(aggregation: &Aggregation, provenance: Provenance) -> FeatureCollection {
    let mut meta = JsonObject::new();
    meta.insert("period".to_string(), serde_json::json!(aggregation.period));
    meta.insert(
        "provenance".to_string(),
        serde_json::json!(provenance.to_string()),
    );
    meta.insert("kpi".to_string(), serde_json::json!(aggregation.kpi));

    FeatureCollection {
        bbox: None,
        features: aggregation.regions.iter().map(region_feature).collect(),
        foreign_members: Some(meta),
    }
}

/// Writes the aggregation to `path` as pretty-printed `GeoJSON`.
///
/// # Errors
///
/// Returns [`PipelineError`] if serialization or the write fails.
pub fn write_geojson(
    aggregation: &Aggregation,
    provenance: Provenance,
    path: &Path,
) -> Result<(), PipelineError> {
    let collection = feature_collection(aggregation, provenance);
    let text = serde_json::to_string_pretty(&collection)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;

    log::info!(
        "Exported {} regions to {}",
        collection.features.len(),
        path.display()
    );
    Ok(())
}
