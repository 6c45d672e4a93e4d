//! Listing derivation pipeline.
//!
//! Rows flow through [`map`] into summaries and details, [`keywords`]
//! supplies their tags, and [`query`] filters, orders and pages the result.

pub mod keywords;
pub mod map;
pub mod query;

pub use map::{MapContext, to_detail, to_summaries, to_summary};
pub use query::{ListingFilter, Page, SortBy, filter, paginate, sort};
