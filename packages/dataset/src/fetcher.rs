//! Remote-first dataset fetcher with local cache fallback.
//!
//! The remote exchange mimics a browser visit: a warm-up request to the
//! portal's origin collects session cookies, then the data request reuses
//! the same cookie store with a longer timeout. Each request is attempted
//! exactly once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use disability_map_dataset_models::{Dataset, DatasetSourceDefinition, Record};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER};

use crate::{DatasetFetcher, FetchError, parsing};

/// Fetches a dataset from its remote endpoint, falling back to the cache
/// file named in its definition.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    definition: DatasetSourceDefinition,
    cache_path: PathBuf,
}

impl SourceFetcher {
    /// Creates a fetcher. A relative `cache_file` resolves against
    /// `data_dir`; an absolute one is used as-is.
    #[must_use]
    pub fn new(definition: DatasetSourceDefinition, data_dir: &Path) -> Self {
        let cache_path = data_dir.join(&definition.cache_file);
        Self {
            definition,
            cache_path,
        }
    }

    /// Returns the source definition.
    #[must_use]
    pub const fn definition(&self) -> &DatasetSourceDefinition {
        &self.definition
    }

    /// Returns the resolved cache file path.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Builds a client with browser-like identity headers and a cookie
    /// store shared by the warm-up and data requests.
    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        let config = &self.definition.fetcher;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        if let Some(referer) = &config.referer {
            headers.insert(REFERER, header_value(referer)?);
        }

        reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(Into::into)
    }

    /// Runs the two-step remote exchange and parses the body.
    ///
    /// The warm-up response status is not checked; only transport failures
    /// on the warm-up abort the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on connection failure, timeout, non-success
    /// status, or a body without a `data` array.
    pub async fn fetch_remote(&self) -> Result<Vec<Record>, FetchError> {
        let config = &self.definition.fetcher;
        let client = self.build_client()?;

        if let Some(warmup_url) = &config.warmup_url {
            let resp = client
                .get(warmup_url)
                .timeout(Duration::from_secs(config.warmup_timeout_secs))
                .send()
                .await?;
            log::debug!("Warm-up {warmup_url} answered {}", resp.status());
        }

        let mut request = client
            .get(&config.api_url)
            .timeout(Duration::from_secs(config.data_timeout_secs));
        if let Some(limit) = config.limit {
            request = request.query(&[("limit", limit)]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: resp.url().to_string(),
            });
        }

        let text = resp.text().await?;
        let body: serde_json::Value = serde_json::from_str(&text)?;
        parsing::records_from_body(&body, &self.definition.fields)
    }

    /// Reads the local cache file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the file exists but cannot be read or has
    /// no `data` array.
    pub fn read_cache_file(&self) -> Result<Option<Vec<Record>>, FetchError> {
        if !self.cache_path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.cache_path)?;
        let body: serde_json::Value = serde_json::from_str(&text)?;
        parsing::records_from_body(&body, &self.definition.fields).map(Some)
    }

    fn fall_back(&self, reason: &str) -> Dataset {
        match self.read_cache_file() {
            Ok(Some(records)) => {
                log::warn!(
                    "[{}] Using cached copy {} ({} records)",
                    self.definition.id,
                    self.cache_path.display(),
                    records.len()
                );
                Dataset::cached(records, reason)
            }
            Ok(None) => {
                log::error!(
                    "[{}] No cache file at {}",
                    self.definition.id,
                    self.cache_path.display()
                );
                Dataset::absent(format!(
                    "{reason}; no cache file at {}",
                    self.cache_path.display()
                ))
            }
            Err(e) => {
                log::error!(
                    "[{}] Cache file {} is unusable: {e}",
                    self.definition.id,
                    self.cache_path.display()
                );
                Dataset::absent(format!("{reason}; cache file unusable: {e}"))
            }
        }
    }
}

#[async_trait]
impl DatasetFetcher for SourceFetcher {
    fn id(&self) -> &str {
        &self.definition.id
    }

    async fn fetch(&self) -> Dataset {
        log::info!(
            "[{}] Fetching {}",
            self.definition.id,
            self.definition.fetcher.api_url
        );

        match self.fetch_remote().await {
            Ok(records) => {
                log::info!(
                    "[{}] Remote fetch returned {} records",
                    self.definition.id,
                    records.len()
                );
                Dataset::remote(records)
            }
            Err(e) => {
                log::warn!(
                    "[{}] Remote fetch failed, falling back to cache: {e}",
                    self.definition.id
                );
                self.fall_back(&e.to_string())
            }
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::Malformed {
        message: format!("Invalid header value {value:?}: {e}"),
    })
}
