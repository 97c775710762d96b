#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! End-to-end pipeline: acquire the dataset, load the boundaries, aggregate.
//!
//! A [`Pipeline`] owns both caches for the life of the process. Each
//! [`Pipeline::run`] either yields a [`PipelineReport`] ready for the
//! presentation layer or fails with [`PipelineError::NoData`], the one
//! terminal condition callers must show to the user.

pub mod export;
pub mod paths;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use disability_map_aggregate::{AggregateError, NoDataReason, aggregate};
use disability_map_aggregate_models::Aggregation;
use disability_map_boundary::BoundaryError;
use disability_map_boundary::cache::BoundaryCache;
use disability_map_boundary::loader::BoundaryLoader;
use disability_map_boundary_models::{BoundaryDefinition, NameAttribute};
use disability_map_dataset::DatasetFetcher;
use disability_map_dataset::cache::DatasetCache;
use disability_map_dataset::fetcher::SourceFetcher;
use disability_map_dataset_models::{Dataset, DatasetSourceDefinition, Provenance};
use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Nothing can be shown. The pipeline stopped before producing a map.
    #[error("No data available: {reason}")]
    NoData {
        /// Why there is no data.
        reason: NoDataReason,
    },

    /// The boundary file exists but could not be parsed.
    #[error("Boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    /// Writing an export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing an export failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AggregateError> for PipelineError {
    fn from(value: AggregateError) -> Self {
        match value {
            AggregateError::NoData(reason) => Self::NoData { reason },
        }
    }
}

/// The result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The dataset the aggregation was computed from.
    pub dataset: Arc<Dataset>,
    /// The boundary property the region names were read from.
    pub name_attribute: NameAttribute,
    /// The aggregation result.
    pub aggregation: Aggregation,
}

impl PipelineReport {
    /// Where the dataset came from.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.dataset.provenance
    }

    /// Why the remote path was not used, if it wasn't.
    #[must_use]
    pub fn fallback_reason(&self) -> Option<&str> {
        self.dataset.fallback_reason.as_deref()
    }
}

/// Owns the dataset and boundary caches and runs the aggregation.
pub struct Pipeline<F = SourceFetcher> {
    datasets: DatasetCache<F>,
    boundaries: BoundaryCache,
}

impl Pipeline<SourceFetcher> {
    /// Builds a pipeline from a source and a boundary definition, resolving
    /// relative file paths against `data_dir`.
    #[must_use]
    pub fn from_definitions(
        source: DatasetSourceDefinition,
        boundary: BoundaryDefinition,
        data_dir: &Path,
    ) -> Self {
        let ttl = Duration::from_secs(source.ttl_secs);
        Self::new(
            SourceFetcher::new(source, data_dir),
            ttl,
            BoundaryLoader::new(boundary, data_dir),
        )
    }
}

impl<F: DatasetFetcher> Pipeline<F> {
    /// Creates a pipeline with empty caches.
    #[must_use]
    pub const fn new(fetcher: F, ttl: Duration, loader: BoundaryLoader) -> Self {
        Self {
            datasets: DatasetCache::new(fetcher, ttl),
            boundaries: BoundaryCache::new(loader),
        }
    }

    /// Returns the dataset cache.
    #[must_use]
    pub const fn dataset_cache(&self) -> &DatasetCache<F> {
        &self.datasets
    }

    /// Returns the boundary cache.
    #[must_use]
    pub const fn boundary_cache(&self) -> &BoundaryCache {
        &self.boundaries
    }

    /// Acquires the dataset (through the TTL cache), loads the boundaries
    /// (once per process), and aggregates.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::NoData`] if the dataset is empty, no record has a
    ///   reporting period, or the boundary collection is empty. Boundaries
    ///   are not loaded when the dataset is already empty.
    /// * [`PipelineError::Boundary`] if the boundary file cannot be parsed.
    pub async fn run(&mut self) -> Result<PipelineReport, PipelineError> {
        let dataset = self.datasets.get().await;
        let fetcher_id = self.datasets.fetcher().id().to_string();
        log_provenance(&fetcher_id, &dataset);

        if dataset.is_empty() {
            return Err(PipelineError::NoData {
                reason: NoDataReason::EmptyDataset {
                    provenance: dataset.provenance,
                },
            });
        }

        let boundaries = self.boundaries.get()?;
        log::debug!(
            "[{fetcher_id}] {} boundaries, names from {:?} ({})",
            boundaries.len(),
            boundaries.name_attribute.name,
            boundaries.name_attribute.resolution
        );

        let aggregation = aggregate(&dataset, &boundaries)?;
        log::info!(
            "[{fetcher_id}] Period {}: {} of {} regions matched",
            aggregation.period,
            aggregation.matched_count(),
            aggregation.regions.len()
        );

        Ok(PipelineReport {
            dataset,
            name_attribute: boundaries.name_attribute.clone(),
            aggregation,
        })
    }

    /// Drops both caches and runs again.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`].
    pub async fn refresh(&mut self) -> Result<PipelineReport, PipelineError> {
        self.invalidate();
        self.run().await
    }

    /// Drops both caches so the next [`Self::run`] re-acquires everything.
    pub fn invalidate(&mut self) {
        self.datasets.invalidate();
        self.boundaries.invalidate();
    }
}

fn log_provenance(fetcher_id: &str, dataset: &Dataset) {
    let reason = dataset.fallback_reason.as_deref().unwrap_or("unknown");
    match dataset.provenance {
        Provenance::Remote => log::info!(
            "[{fetcher_id}] Using live data ({} records)",
            dataset.records.len()
        ),
        Provenance::Cached => log::warn!(
            "[{fetcher_id}] Using cached data ({} records): {reason}",
            dataset.records.len()
        ),
        Provenance::Absent => log::error!("[{fetcher_id}] No data could be loaded: {reason}"),
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use disability_map_dataset_models::Record;

    use super::test_support::{
        BOUNDARY_FILE, boundary_definition, scratch_dir, write_boundaries,
    };
    use super::*;

    struct StubFetcher {
        dataset: Dataset,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DatasetFetcher for StubFetcher {
        fn id(&self) -> &str {
            "stub"
        }

        async fn fetch(&self) -> Dataset {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.dataset.clone()
        }
    }

    fn record(region: &str, value: f64) -> Record {
        Record {
            region: region.to_string(),
            period: Some(2023),
            category: "FISIK".to_string(),
            value: Some(value),
        }
    }

    fn pipeline(dir: &Path, dataset: Dataset) -> (Pipeline<StubFetcher>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = StubFetcher {
            dataset,
            calls: calls.clone(),
        };
        let loader = BoundaryLoader::new(boundary_definition(), dir);
        (
            Pipeline::new(fetcher, Duration::from_secs(3600), loader),
            calls,
        )
    }

    #[tokio::test]
    async fn produces_report_for_remote_data() {
        let dir = scratch_dir("remote_report");
        write_boundaries(&dir, &["BOGOR", "GARUT"]);
        let dataset = Dataset::remote(vec![record("KOTA BOGOR", 12.0)]);
        let (mut pipeline, _) = pipeline(&dir, dataset);

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.provenance(), Provenance::Remote);
        assert!(report.fallback_reason().is_none());
        assert_eq!(report.name_attribute.name, "KABKOT");
        assert_eq!(report.aggregation.regions.len(), 2);
        assert_eq!(report.aggregation.matched_count(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn cached_data_is_reported_with_its_reason() {
        let dir = scratch_dir("cached_report");
        write_boundaries(&dir, &["BOGOR"]);
        let dataset = Dataset::cached(vec![record("KOTA BOGOR", 1.0)], "HTTP 403");
        let (mut pipeline, _) = pipeline(&dir, dataset);

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.provenance(), Provenance::Cached);
        assert_eq!(report.fallback_reason(), Some("HTTP 403"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn absent_dataset_stops_before_loading_boundaries() {
        let dir = scratch_dir("absent");
        write_boundaries(&dir, &["BOGOR"]);
        let (mut pipeline, _) = pipeline(&dir, Dataset::absent("offline, no cache"));

        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::NoData {
                reason: NoDataReason::EmptyDataset {
                    provenance: Provenance::Absent
                }
            }
        ));
        assert!(pipeline.boundary_cache().loaded_at().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_boundary_file_is_no_data() {
        let dir = scratch_dir("no_boundaries");
        let dataset = Dataset::remote(vec![record("KOTA BOGOR", 1.0)]);
        let (mut pipeline, _) = pipeline(&dir, dataset);

        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::NoData {
                reason: NoDataReason::NoBoundaries
            }
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn malformed_boundary_file_is_a_boundary_error() {
        let dir = scratch_dir("bad_boundaries");
        std::fs::write(dir.join(BOUNDARY_FILE), "not geojson").unwrap();
        let dataset = Dataset::remote(vec![record("KOTA BOGOR", 1.0)]);
        let (mut pipeline, _) = pipeline(&dir, dataset);

        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::Boundary(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn repeated_runs_reuse_the_cached_dataset() {
        let dir = scratch_dir("reuse");
        write_boundaries(&dir, &["BOGOR"]);
        let dataset = Dataset::remote(vec![record("KOTA BOGOR", 1.0)]);
        let (mut pipeline, calls) = pipeline(&dir, dataset);

        pipeline.run().await.unwrap();
        pipeline.run().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        pipeline.refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn aggregate_no_data_maps_to_pipeline_no_data() {
        let err: PipelineError = AggregateError::NoData(NoDataReason::NoReportingPeriod).into();
        assert_eq!(
            err.to_string(),
            "No data available: no record has a reporting period"
        );
    }
}
