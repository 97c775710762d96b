//! Time-bounded in-memory cache for acquired datasets.
//!
//! Holds the last [`Dataset`] produced by a [`DatasetFetcher`] together with
//! the instant it was acquired. Within the time-to-live, [`DatasetCache::get`]
//! returns the same dataset without touching the network. After it expires,
//! the next call reruns the full acquisition.

use std::sync::Arc;
use std::time::{Duration, Instant};

use disability_map_dataset_models::Dataset;

use crate::DatasetFetcher;

struct Entry {
    dataset: Arc<Dataset>,
    refreshed_at: Instant,
}

/// A dataset cache owned by the pipeline.
pub struct DatasetCache<F> {
    fetcher: F,
    ttl: Duration,
    entry: Option<Entry>,
}

impl<F: DatasetFetcher> DatasetCache<F> {
    /// Creates an empty cache around `fetcher`.
    #[must_use]
    pub const fn new(fetcher: F, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            entry: None,
        }
    }

    /// Returns the wrapped fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns when the cached dataset was last acquired, if any.
    #[must_use]
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.entry.as_ref().map(|e| e.refreshed_at)
    }

    /// Returns `true` if a cached dataset exists and is within its TTL.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| e.refreshed_at.elapsed() < self.ttl)
    }

    /// Returns the cached dataset, acquiring a new one if the cache is
    /// empty or expired.
    ///
    /// Every acquisition outcome is cached, including
    /// [`Provenance::Absent`](disability_map_dataset_models::Provenance::Absent).
    pub async fn get(&mut self) -> Arc<Dataset> {
        if let Some(entry) = &self.entry
            && entry.refreshed_at.elapsed() < self.ttl
        {
            log::debug!(
                "[{}] Dataset cache hit ({:?} old)",
                self.fetcher.id(),
                entry.refreshed_at.elapsed()
            );
            return entry.dataset.clone();
        }

        self.refresh().await
    }

    /// Reruns the acquisition regardless of freshness and caches the result.
    pub async fn refresh(&mut self) -> Arc<Dataset> {
        let dataset = Arc::new(self.fetcher.fetch().await);
        log::debug!(
            "[{}] Dataset cache refreshed ({}, {} records)",
            self.fetcher.id(),
            dataset.provenance,
            dataset.records.len()
        );
        self.entry = Some(Entry {
            dataset: dataset.clone(),
            refreshed_at: Instant::now(),
        });
        dataset
    }

    /// Drops the cached dataset so the next [`Self::get`] re-acquires.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
