//! Append-only, time-indexed persistence for BME680 readings.
//!
//! The service only talks to [`ReadingStore`]; [`PgReadingStore`] is the
//! production backend and [`MemoryReadingStore`] keeps everything in process.

mod memory;
mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{NewReading, Reading};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached, or did not answer within the
    /// configured time budget.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    WriteFailed(String),

    #[error("storage read failed: {0}")]
    ReadFailed(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persists `reading` and returns its row id.
    async fn insert(&self, reading: NewReading) -> Result<i64, StoreError>;

    /// Returns every reading with `recorded_at > cutoff`, newest first.
    /// Readings sharing a timestamp are ordered by descending row id.
    async fn query_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reading>, StoreError>;
}
