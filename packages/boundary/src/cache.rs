//! Load-once cache for the boundary collection.
//!
//! Parsing the boundary file is paid once per process. There is no expiry;
//! only [`BoundaryCache::invalidate`] makes the next access reload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use disability_map_boundary_models::BoundaryCollection;

use crate::BoundaryError;
use crate::loader::BoundaryLoader;

struct Entry {
    collection: Arc<BoundaryCollection>,
    loaded_at: DateTime<Utc>,
}

/// A boundary cache owned by the pipeline.
pub struct BoundaryCache {
    loader: BoundaryLoader,
    entry: Option<Entry>,
}

impl BoundaryCache {
    /// Creates an empty cache around `loader`.
    #[must_use]
    pub const fn new(loader: BoundaryLoader) -> Self {
        Self {
            loader,
            entry: None,
        }
    }

    /// Returns the wrapped loader.
    #[must_use]
    pub const fn loader(&self) -> &BoundaryLoader {
        &self.loader
    }

    /// Returns when the cached collection was loaded, if any.
    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|e| e.loaded_at)
    }

    /// Returns the cached collection, loading it on first access.
    ///
    /// A missing file is cached as an empty collection. Load errors are not
    /// cached, so the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the boundary file exists but cannot be
    /// parsed.
    pub fn get(&mut self) -> Result<Arc<BoundaryCollection>, BoundaryError> {
        if let Some(entry) = &self.entry {
            log::debug!("Boundary cache hit (loaded {})", entry.loaded_at);
            return Ok(entry.collection.clone());
        }

        let collection = Arc::new(self.loader.load()?);
        self.entry = Some(Entry {
            collection: collection.clone(),
            loaded_at: Utc::now(),
        });
        Ok(collection)
    }

    /// Drops the cached collection so the next [`Self::get`] reloads it.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
