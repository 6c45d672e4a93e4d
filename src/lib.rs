// src/lib.rs

//! Job listing data core.
//!
//! Loads postings from a CSV file, derives list and detail projections,
//! and serves filtered, sorted and paginated views with caching.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
