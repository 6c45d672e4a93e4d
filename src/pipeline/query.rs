// src/pipeline/query.rs

//! Filtering, ordering and pagination of listing summaries.

use std::cmp::Reverse;

use chrono::{Offset, Utc};
use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::models::{JobSource, ListingSummary};
use crate::utils::date::epoch_millis_or_zero;

/// Optional criteria; every present criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Case-insensitive substring of title, company, location or a keyword
    pub keyword: Option<String>,
    pub source: Option<JobSource>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none() && self.source.is_none() && self.location.is_none()
    }

    pub fn matches(&self, listing: &ListingSummary) -> bool {
        if let Some(source) = self.source {
            if listing.source != source {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !contains_ci(&listing.location, location) {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            let hit = contains_ci(&listing.title, keyword)
                || contains_ci(&listing.company, keyword)
                || contains_ci(&listing.location, keyword)
                || listing.keywords.iter().any(|k| contains_ci(k, keyword));
            if !hit {
                return false;
            }
        }

        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Ordering applied to a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest registration first
    #[default]
    Recent,
    /// Fewest days left first, then by company
    Deadline,
    /// Company name in collation order
    Company,
}

impl SortBy {
    /// Parse a request value. Unknown values fall back to `Recent`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "deadline" => Self::Deadline,
            "company" => Self::Company,
            _ => Self::Recent,
        }
    }
}

/// Keep the listings that satisfy `filter`, preserving their order.
pub fn filter(listings: Vec<ListingSummary>, filter: &ListingFilter) -> Vec<ListingSummary> {
    if filter.is_empty() {
        return listings;
    }
    listings.into_iter().filter(|l| filter.matches(l)).collect()
}

/// Sorted copy of `listings`. Ties keep their input order.
pub fn sort(listings: &[ListingSummary], sort_by: SortBy) -> Vec<ListingSummary> {
    let mut sorted = listings.to_vec();

    match sort_by {
        SortBy::Recent => {
            // Unparseable dates count as the epoch and sink to the end
            let utc = Utc.fix();
            sorted.sort_by_cached_key(|l| Reverse(epoch_millis_or_zero(&l.registration_date, utc)));
        }
        SortBy::Deadline => {
            sorted.sort_by(|a, b| {
                a.days_left
                    .cmp(&b.days_left)
                    .then_with(|| a.company.cmp(&b.company))
            });
        }
        SortBy::Company => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(a.company.as_str(), b.company.as_str()));
        }
    }

    sorted
}

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole result set
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slice out page `page` (1-based) of `limit` items.
///
/// A page past the end is empty but still reports the real totals.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);

    Page {
        items: items.into_iter().skip(start).take(limit).collect(),
        total,
        page,
        limit,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}
