// src/models/mod.rs

//! Domain models for the listing core.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

pub mod api;
mod config;
mod listing;
mod row;

// Re-export all public types
pub use api::{
    CacheActionResponse, CacheStatsResponse, DetailOutcome, DetailResponse, ListQuery,
    ListResponse, MessageResponse, parse_listing_id,
};
pub use config::{CacheConfig, Config, DataConfig, ListingConfig, LocaleConfig, QueryConfig};
pub use listing::{Content, JobSource, ListingDetail, ListingSummary};
pub use row::{COLUMNS, RawRow, header_index};
