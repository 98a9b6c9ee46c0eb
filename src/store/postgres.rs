use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error};

use super::{ReadingStore, StoreError};
use crate::db::models::{NewReading, Reading};

/// Postgres-backed store. Each statement borrows a connection from the pool
/// for its own duration only; nothing spans requests.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgReadingStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(op, timeout_ms = self.timeout.as_millis() as u64, "Store operation timed out");
                Err(StoreError::Unavailable(format!(
                    "{op} did not complete within {:?}",
                    self.timeout
                )))
            }
        }
    }
}

/// Connection-level failures mean the backend is unreachable; anything else
/// happened on a live connection and is reported as a failed operation.
fn classify(e: sqlx::Error, failed: fn(String) -> StoreError) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(e.to_string()),
        other => failed(other.to_string()),
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert(&self, reading: NewReading) -> Result<i64, StoreError> {
        self.bounded("insert", async {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO bme680_readings
                    (temperature, pressure, humidity, gas_resistance, recorded_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(reading.temperature)
            .bind(reading.pressure)
            .bind(reading.humidity)
            .bind(reading.gas_resistance)
            .bind(reading.recorded_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, StoreError::WriteFailed))?;

            debug!(id, "Reading inserted");
            Ok(id)
        })
        .await
    }

    async fn query_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reading>, StoreError> {
        self.bounded("query_since", async {
            let rows = sqlx::query_as::<_, Reading>(
                r#"
                SELECT id, temperature, pressure, humidity, gas_resistance, recorded_at
                FROM bme680_readings
                WHERE recorded_at > $1
                ORDER BY recorded_at DESC, id DESC
                "#,
            )
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, StoreError::ReadFailed))?;

            debug!(cutoff = %cutoff, rows = rows.len(), "Readings fetched");
            Ok(rows)
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests (the `sqlx::test` ones need a live Postgres through DATABASE_URL)
// ---------------------------------------------------------------------------
