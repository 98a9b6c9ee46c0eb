use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ReadingStore, StoreError};
use crate::db::models::{NewReading, Reading};

/// In-process reading store used as the test double for [`ReadingStore`].
///
/// Cheap to clone; all clones share the same rows. Nothing survives a
/// restart and the server binary never selects it.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    rows: Arc<RwLock<Vec<Reading>>>,
    last_id: Arc<AtomicI64>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert(&self, reading: NewReading) -> Result<i64, StoreError> {
        let mut rows = self.rows.write().await;
        // Allocated under the write lock so ids follow insertion order.
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        rows.push(reading.into_reading(id));
        Ok(id)
    }

    async fn query_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reading>, StoreError> {
        let mut matching: Vec<Reading> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| r.recorded_at > cutoff)
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matching)
    }
}
