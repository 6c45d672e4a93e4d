//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source file location and loader cache settings
    #[serde(default)]
    pub data: DataConfig,

    /// Shared record cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Listing derivation rules
    #[serde(default)]
    pub listing: ListingConfig,

    /// Request parameter limits
    #[serde(default)]
    pub query: QueryConfig,

    /// Display labels
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading or validation fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let loaded = Self::load(&path).and_then(|config| {
            config.validate()?;
            Ok(config)
        });
        loaded.unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Return `self` if it validates, otherwise the defaults.
    pub fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                log::warn!("Invalid configuration: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.data.file_name.trim().is_empty() {
            return Err(AppError::validation("data.file_name is empty"));
        }
        if self.data.cache_ttl_secs == 0 {
            return Err(AppError::validation("data.cache_ttl_secs must be > 0"));
        }
        if self.cache.cleanup_interval_secs == 0 {
            return Err(AppError::validation(
                "cache.cleanup_interval_secs must be > 0",
            ));
        }
        if self.listing.always_open_sentinels.is_empty() {
            return Err(AppError::validation(
                "listing.always_open_sentinels must not be empty",
            ));
        }
        if self.listing.utc_offset().is_none() {
            return Err(AppError::validation(format!(
                "listing.utc_offset_hours out of range: {}",
                self.listing.utc_offset_hours
            )));
        }
        if self.query.max_limit == 0 {
            return Err(AppError::validation("query.max_limit must be > 0"));
        }
        if self.query.default_limit == 0 || self.query.default_limit > self.query.max_limit {
            return Err(AppError::validation(
                "query.default_limit must be within 1..=query.max_limit",
            ));
        }
        Ok(())
    }
}

/// Source file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory the source file must resolve inside
    #[serde(default = "defaults::base_dir")]
    pub base_dir: PathBuf,

    /// File name relative to `base_dir`
    #[serde(default = "defaults::file_name")]
    pub file_name: String,

    /// How long parsed rows stay valid while the file is unchanged
    #[serde(default = "defaults::file_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl DataConfig {
    /// Full path of the configured source file.
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.file_name)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_dir: defaults::base_dir(),
            file_name: defaults::file_name(),
            cache_ttl_secs: defaults::file_cache_ttl(),
        }
    }
}

/// Shared record cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied by `set_default`
    #[serde(default = "defaults::record_ttl")]
    pub default_ttl_secs: u64,

    /// Period of the background expiry sweep
    #[serde(default = "defaults::cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_secs.saturating_mul(1000)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: defaults::record_ttl(),
            cleanup_interval_secs: defaults::cleanup_interval(),
        }
    }
}

/// Rules used when deriving listings from raw rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Deadline values meaning the posting never closes
    #[serde(default = "defaults::always_open_sentinels")]
    pub always_open_sentinels: Vec<String>,

    /// Days-left reported for always-open postings
    #[serde(default = "defaults::always_open_days")]
    pub always_open_days: i64,

    /// Days-left reported when the deadline cannot be parsed
    #[serde(default = "defaults::unparseable_deadline_days")]
    pub unparseable_deadline_days: i64,

    /// Postings with `0 < days_left <= urgent_threshold_days` are urgent
    #[serde(default = "defaults::urgent_threshold_days")]
    pub urgent_threshold_days: i64,

    /// Offset used to interpret timestamps that carry no zone
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "defaults::summary_thumbnail")]
    pub summary_thumbnail: String,

    #[serde(default = "defaults::detail_thumbnail")]
    pub detail_thumbnail: String,
}

impl ListingConfig {
    /// Zone offset for naive timestamps, `None` when out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours.checked_mul(3600)?)
    }

    pub fn is_always_open(&self, deadline: &str) -> bool {
        self.always_open_sentinels.iter().any(|s| s == deadline)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            always_open_sentinels: defaults::always_open_sentinels(),
            always_open_days: defaults::always_open_days(),
            unparseable_deadline_days: defaults::unparseable_deadline_days(),
            urgent_threshold_days: defaults::urgent_threshold_days(),
            utc_offset_hours: defaults::utc_offset_hours(),
            summary_thumbnail: defaults::summary_thumbnail(),
            detail_thumbnail: defaults::detail_thumbnail(),
        }
    }
}

/// Request parameter limits enforced before the loader is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "defaults::default_limit")]
    pub default_limit: usize,

    #[serde(default = "defaults::max_limit")]
    pub max_limit: usize,

    /// Longest accepted keyword, in characters
    #[serde(default = "defaults::max_keyword_len")]
    pub max_keyword_len: usize,

    #[serde(default = "defaults::max_listing_id")]
    pub max_listing_id: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::default_limit(),
            max_limit: defaults::max_limit(),
            max_keyword_len: defaults::max_keyword_len(),
            max_listing_id: defaults::max_listing_id(),
        }
    }
}

/// Display labels for derived fields and responses.
///
/// `{n}` is replaced with the count in the relative-time templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "defaults::just_now")]
    pub just_now: String,

    #[serde(default = "defaults::hours_ago")]
    pub hours_ago: String,

    #[serde(default = "defaults::days_ago")]
    pub days_ago: String,

    #[serde(default = "defaults::recently")]
    pub recently: String,

    #[serde(default = "defaults::nationwide")]
    pub nationwide: String,

    #[serde(default = "defaults::data_unavailable")]
    pub data_unavailable: String,

    #[serde(default = "defaults::not_found")]
    pub not_found: String,

    /// Deadline countdown, e.g. `D-3`
    #[serde(default = "defaults::d_day")]
    pub d_day: String,

    #[serde(default = "defaults::closes_today")]
    pub closes_today: String,

    #[serde(default = "defaults::closed")]
    pub closed: String,
}

impl LocaleConfig {
    pub fn hours_ago(&self, hours: i64) -> String {
        self.hours_ago.replace("{n}", &hours.to_string())
    }

    pub fn days_ago(&self, days: i64) -> String {
        self.days_ago.replace("{n}", &days.to_string())
    }

    pub fn d_day(&self, days: i64) -> String {
        self.d_day.replace("{n}", &days.to_string())
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            just_now: defaults::just_now(),
            hours_ago: defaults::hours_ago(),
            days_ago: defaults::days_ago(),
            recently: defaults::recently(),
            nationwide: defaults::nationwide(),
            data_unavailable: defaults::data_unavailable(),
            not_found: defaults::not_found(),
            d_day: defaults::d_day(),
            closes_today: defaults::closes_today(),
            closed: defaults::closed(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Data defaults
    pub fn base_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn file_name() -> String {
        "processed_job_data.csv".into()
    }
    pub fn file_cache_ttl() -> u64 {
        5 * 60
    }

    // Cache defaults
    pub fn record_ttl() -> u64 {
        5 * 60
    }
    pub fn cleanup_interval() -> u64 {
        10 * 60
    }

    // Listing defaults
    pub fn always_open_sentinels() -> Vec<String> {
        vec!["상시채용".into(), "채용시 마감".into()]
    }
    pub fn always_open_days() -> i64 {
        999
    }
    pub fn unparseable_deadline_days() -> i64 {
        30
    }
    pub fn urgent_threshold_days() -> i64 {
        7
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }
    pub fn summary_thumbnail() -> String {
        "/placeholder.svg?height=180&width=320".into()
    }
    pub fn detail_thumbnail() -> String {
        "/placeholder.svg?height=300&width=600".into()
    }

    // Query defaults
    pub fn default_limit() -> usize {
        20
    }
    pub fn max_limit() -> usize {
        100
    }
    pub fn max_keyword_len() -> usize {
        100
    }
    pub fn max_listing_id() -> u64 {
        999_999
    }

    // Locale defaults
    pub fn just_now() -> String {
        "just now".into()
    }
    pub fn hours_ago() -> String {
        "{n} hours ago".into()
    }
    pub fn days_ago() -> String {
        "{n} days ago".into()
    }
    pub fn recently() -> String {
        "recently".into()
    }
    pub fn nationwide() -> String {
        "nationwide".into()
    }
    pub fn data_unavailable() -> String {
        "data unavailable".into()
    }
    pub fn not_found() -> String {
        "listing not found".into()
    }
    pub fn d_day() -> String {
        "D-{n}".into()
    }
    pub fn closes_today() -> String {
        "closes today".into()
    }
    pub fn closed() -> String {
        "closed".into()
    }
}
