//! Service layer for the listing core.
//!
//! This module contains:
//! - The shared TTL record cache (`RecordCache`)
//! - Listing operations and cache administration (`ListingService`)

pub mod cache;
mod listings;

pub use cache::{CacheStats, RecordCache, spawn_cleanup};
pub use listings::{ListingOverview, ListingService, OVERVIEW_KEY, SOURCE_DATA_KEY};
