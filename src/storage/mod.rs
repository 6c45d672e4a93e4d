//! Row sources for the listing core.
//!
//! The only production backend is [`CsvLoader`], which reads a single
//! delimited file and keeps the parsed rows in memory while the file is
//! unchanged.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! └── processed_job_data.csv   # 14 fixed columns, read-only
//! ```

pub mod csv;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawRow;

// Re-export for convenience
pub use self::csv::CsvLoader;

/// Outcome of loading rows from a source.
///
/// `Loaded` with zero rows means the source exists and is empty;
/// `Unavailable` means it could not be read at all.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Arc<[RawRow]>),
    Unavailable { reason: String },
}

impl LoadOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Rows if the source was readable.
    pub fn rows(&self) -> Option<&Arc<[RawRow]>> {
        match self {
            Self::Loaded(rows) => Some(rows),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Trait for listing row backends.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Load all rows.
    ///
    /// Only configuration or containment failures are errors; an unreadable
    /// source is reported through [`LoadOutcome::Unavailable`].
    async fn load(&self) -> Result<LoadOutcome>;

    /// Drop any cached rows so the next `load` reads the source again.
    async fn clear(&self);
}
