//! Request parsing and response shapes exchanged with the HTTP layer.
//!
//! Validation happens here, before any data is loaded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{LocaleConfig, QueryConfig};
use crate::models::{JobSource, ListingDetail, ListingSummary};
use crate::pipeline::query::{ListingFilter, Page, SortBy};
use crate::services::cache::CacheStats;

/// Validated list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: ListingFilter,
    pub sort_by: SortBy,
    /// 1-based, never zero
    pub page: usize,
    /// Within `1..=max_limit`
    pub limit: usize,
}

impl ListQuery {
    /// Default query for the given limits.
    pub fn new(limits: &QueryConfig) -> Self {
        Self {
            filter: ListingFilter::default(),
            sort_by: SortBy::default(),
            page: 1,
            limit: limits.default_limit,
        }
    }

    /// Build a query from raw string parameters.
    ///
    /// Recognized keys: `keyword`, `source`, `location`, `sortBy`, `page`, `limit`.
    /// Numeric parameters that fail to parse fall back to their defaults.
    pub fn from_params(params: &HashMap<String, String>, limits: &QueryConfig) -> Result<Self> {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let keyword = get("keyword").map(str::to_string);
        if let Some(keyword) = &keyword {
            let len = keyword.chars().count();
            if len > limits.max_keyword_len {
                return Err(AppError::validation(format!(
                    "keyword is too long ({len} > {} characters)",
                    limits.max_keyword_len
                )));
            }
        }

        let source = match get("source") {
            None | Some("all") => None,
            Some(raw) => Some(raw.parse::<JobSource>().map_err(AppError::validation)?),
        };

        let sort_by = get("sortBy").map(SortBy::parse).unwrap_or_default();

        let page = get("page")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|p| p.max(1) as usize)
            .unwrap_or(1);

        let max_limit = limits.max_limit.max(1) as i64;
        let limit = get("limit")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|l| l.clamp(1, max_limit) as usize)
            .unwrap_or(limits.default_limit);

        Ok(Self {
            filter: ListingFilter {
                keyword,
                source,
                location: get("location").map(str::to_string),
            },
            sort_by,
            page,
            limit,
        })
    }
}

/// Parse a listing id from a path segment.
pub fn parse_listing_id(raw: &str, limits: &QueryConfig) -> Result<usize> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("listing id is not numeric: {raw:?}")))?;

    if id <= 0 || id as u64 > limits.max_listing_id {
        return Err(AppError::validation(format!(
            "listing id out of range: {id} (expected 1..={})",
            limits.max_listing_id
        )));
    }
    Ok(id as usize)
}

/// Response to a list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub jobs: Vec<ListingSummary>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
    /// Set when the source could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ListResponse {
    /// Empty response flagged with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            jobs: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 0,
            has_next: false,
            has_prev: false,
            message: Some(message.into()),
        }
    }
}

impl From<Page<ListingSummary>> for ListResponse {
    fn from(page: Page<ListingSummary>) -> Self {
        Self {
            jobs: page.items,
            total: page.total,
            page: page.page,
            total_pages: page.total_pages,
            has_next: page.has_next,
            has_prev: page.has_prev,
            message: None,
        }
    }
}

/// Result of a detail lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Found(Box<ListingDetail>),
    NotFound,
    Unavailable(String),
}

impl DetailOutcome {
    /// Message body for outcomes that carry no listing.
    pub fn message(&self, locale: &LocaleConfig) -> Option<MessageResponse> {
        match self {
            Self::Found(_) => None,
            Self::NotFound => Some(MessageResponse::new(&locale.not_found)),
            Self::Unavailable(message) => Some(MessageResponse::new(message)),
        }
    }
}

/// Plain message body for not-found and unavailable responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to a successful detail request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub job: ListingDetail,
}

/// Cache statistics for administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub item_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
    pub memory_estimate_bytes: usize,
    pub keys: Vec<String>,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, keys: Vec<String>) -> Self {
        Self {
            item_count: stats.item_count,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate_percent: stats.hit_rate_percent,
            memory_estimate_bytes: stats.estimated_memory_bytes,
            keys,
        }
    }
}

/// Acknowledgement of a cache management action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_count: Option<usize>,
}
