// src/services/listings.rs

//! Listing service.
//!
//! Composes the row source, the mapper and the query engine into the
//! operations exposed to request handlers, plus cache administration.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::{
    CacheActionResponse, CacheStatsResponse, Config, DetailOutcome, ListQuery, ListResponse,
};
use crate::pipeline::map::{MapContext, to_detail, to_summaries};
use crate::pipeline::query::{filter, paginate, sort};
use crate::services::cache::{RecordCache, spawn_cleanup};
use crate::storage::{CsvLoader, ListingSource, LoadOutcome};

/// Record cache key for the aggregated overview.
pub const OVERVIEW_KEY: &str = "listing-overview";

/// Cache key that stands for the loader's parsed rows.
pub const SOURCE_DATA_KEY: &str = "csv-data";

/// Aggregated counts for landing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOverview {
    pub total: usize,
    /// Keyed by source label
    pub by_source: BTreeMap<String, usize>,
    /// Keyed by short location
    pub by_location: BTreeMap<String, usize>,
    /// Listings flagged urgent
    pub closing_soon: usize,
}

/// Listing operations over a shared row source and record cache.
pub struct ListingService {
    config: Arc<Config>,
    source: Arc<dyn ListingSource>,
    cache: Arc<RecordCache<Value>>,
}

impl ListingService {
    /// Create a service over an explicit row source.
    ///
    /// A configuration that fails validation is replaced by the defaults.
    pub fn new(config: Arc<Config>, source: Arc<dyn ListingSource>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid configuration: {}. Using defaults.", e);
                Arc::new(Config::default())
            }
        };
        let cache = Arc::new(RecordCache::new(config.cache.default_ttl_ms()));
        Self {
            config,
            source,
            cache,
        }
    }

    /// Create a service reading the CSV file named in `config`.
    pub fn from_config(config: Arc<Config>) -> Self {
        let config = Arc::new(Config::clone(&config).validated_or_default());
        let loader = CsvLoader::new(&config.data);
        Self::new(config, Arc::new(loader))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RecordCache<Value>> {
        &self.cache
    }

    /// Filtered, sorted and paginated summaries.
    pub async fn list(&self, query: &ListQuery) -> Result<ListResponse> {
        let rows = match self.source.load().await? {
            LoadOutcome::Loaded(rows) => rows,
            LoadOutcome::Unavailable { reason } => {
                log::warn!("Listing source unavailable: {}", reason);
                return Ok(ListResponse::unavailable(&self.config.locale.data_unavailable));
            }
        };

        let ctx = MapContext::new(&self.config);
        let summaries = filter(to_summaries(&rows, &ctx), &query.filter);
        let sorted = sort(&summaries, query.sort_by);

        log::debug!(
            "List query matched {} of {} rows (sort: {:?}, page: {})",
            sorted.len(),
            rows.len(),
            query.sort_by,
            query.page
        );

        Ok(paginate(sorted, query.page, query.limit).into())
    }

    /// Detail view of listing `id` (1-based).
    pub async fn detail(&self, id: usize) -> Result<DetailOutcome> {
        let rows = match self.source.load().await? {
            LoadOutcome::Loaded(rows) => rows,
            LoadOutcome::Unavailable { reason } => {
                log::warn!("Listing source unavailable: {}", reason);
                return Ok(DetailOutcome::Unavailable(
                    self.config.locale.data_unavailable.clone(),
                ));
            }
        };

        let Some(row) = id.checked_sub(1).and_then(|i| rows.get(i)) else {
            return Ok(DetailOutcome::NotFound);
        };

        let ctx = MapContext::new(&self.config);
        Ok(DetailOutcome::Found(Box::new(to_detail(row, id, &ctx))))
    }

    /// Aggregated counts, served from the record cache while fresh.
    ///
    /// Returns `None` when the source is unavailable; that result is not cached.
    pub async fn overview(&self) -> Result<Option<ListingOverview>> {
        if let Some(cached) = self.cache.get(OVERVIEW_KEY) {
            match serde_json::from_value(cached) {
                Ok(overview) => return Ok(Some(overview)),
                Err(e) => log::warn!("Discarding malformed cached overview: {}", e),
            }
        }

        let rows = match self.source.load().await? {
            LoadOutcome::Loaded(rows) => rows,
            LoadOutcome::Unavailable { reason } => {
                log::warn!("Listing source unavailable: {}", reason);
                return Ok(None);
            }
        };

        let ctx = MapContext::new(&self.config);
        let summaries = to_summaries(&rows, &ctx);

        let mut overview = ListingOverview {
            total: summaries.len(),
            by_source: BTreeMap::new(),
            by_location: BTreeMap::new(),
            closing_soon: 0,
        };
        for summary in &summaries {
            *overview
                .by_source
                .entry(summary.source.label().to_string())
                .or_default() += 1;
            *overview
                .by_location
                .entry(summary.location.clone())
                .or_default() += 1;
            if summary.is_urgent {
                overview.closing_soon += 1;
            }
        }

        self.cache
            .set_default(OVERVIEW_KEY, serde_json::to_value(&overview)?);
        Ok(Some(overview))
    }

    pub fn cache_stats(&self) -> CacheStatsResponse {
        let mut keys = self.cache.keys();
        keys.sort();
        CacheStatsResponse::new(self.cache.stats(), keys)
    }

    /// Sweep expired record cache entries.
    pub fn cache_cleanup(&self) -> CacheActionResponse {
        let removed = self.cache.cleanup();
        log::info!("Cache cleanup removed {} expired items", removed);
        CacheActionResponse {
            success: true,
            message: format!("{removed} expired cache items removed"),
            removed_count: Some(removed),
        }
    }

    /// Empty the record cache and the loader's row cache.
    pub async fn cache_clear(&self) -> CacheActionResponse {
        self.cache.clear();
        self.source.clear().await;
        log::info!("All caches cleared");
        CacheActionResponse {
            success: true,
            message: "all caches cleared".to_string(),
            removed_count: None,
        }
    }

    /// Delete one record cache key. The source data key also drops the
    /// loader's parsed rows.
    pub async fn cache_delete(&self, key: &str) -> Result<CacheActionResponse> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::validation("cache key is required"));
        }

        let mut deleted = self.cache.delete(key);
        if key == SOURCE_DATA_KEY {
            self.source.clear().await;
            deleted = true;
        }

        let message = if deleted {
            log::info!("Cache key '{}' deleted", key);
            format!("cache key '{key}' deleted")
        } else {
            format!("cache key '{key}' not found")
        };

        Ok(CacheActionResponse {
            success: deleted,
            message,
            removed_count: None,
        })
    }

    /// Start the periodic record cache sweep.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        spawn_cleanup(Arc::clone(&self.cache), self.config.cache.cleanup_interval())
    }
}
