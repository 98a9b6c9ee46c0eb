use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::{
    db::models::{NewReading, Reading},
    range::RangeToken,
    store::{ReadingStore, StoreError},
};

/// A validated reading as submitted by the producer. Missing measurements
/// are `None`; `timestamp` is only set when the producer supplies one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingReading {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_resistance: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Ingest and range-query logic in front of a [`ReadingStore`].
///
/// Holds no per-request state; clones share the same store handle. Store
/// failures are returned as-is, without retries.
#[derive(Clone)]
pub struct ReadingService {
    store: Arc<dyn ReadingStore>,
}

impl ReadingService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Stores `reading`, stamping it with the service clock unless the
    /// producer supplied a timestamp. Returns the new row id.
    pub async fn ingest(&self, reading: IncomingReading) -> Result<i64, StoreError> {
        let recorded_at = reading.timestamp.unwrap_or_else(Utc::now);
        let new = NewReading {
            temperature: reading.temperature,
            pressure: reading.pressure,
            humidity: reading.humidity,
            gas_resistance: reading.gas_resistance,
            recorded_at,
        };

        match self.store.insert(new).await {
            Ok(id) => {
                info!(id, recorded_at = %recorded_at, "BME680 data added");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "Error while inserting BME680 data");
                Err(e)
            }
        }
    }

    pub async fn readings_in_range(&self, range: RangeToken) -> Result<Vec<Reading>, StoreError> {
        self.readings_in_range_at(range, Utc::now()).await
    }

    /// Same as [`Self::readings_in_range`] with `now` supplied by the caller.
    pub async fn readings_in_range_at(
        &self,
        range: RangeToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError> {
        let cutoff = range.cutoff(now);
        debug!(range = %range, now = %now, cutoff = %cutoff, "Fetching readings");

        let rows = self.store.query_since(cutoff).await.map_err(|e| {
            error!(range = %range, error = %e, "Error while fetching data");
            e
        })?;

        debug!(range = %range, rows = rows.len(), "Rows fetched");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::store::MemoryReadingStore;

    fn service() -> ReadingService {
        ReadingService::new(Arc::new(MemoryReadingStore::new()))
    }

    fn at(reading_time: DateTime<Utc>, temperature: f64) -> IncomingReading {
        IncomingReading {
            temperature: Some(temperature),
            timestamp: Some(reading_time),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ingested_reading_comes_back_unchanged() {
        let svc = service();
        let reading = IncomingReading {
            temperature: Some(22.5),
            pressure: Some(1013.2),
            humidity: Some(45.0),
            gas_resistance: Some(50000.0),
            timestamp: None,
        };
        let id = svc.ingest(reading).await.unwrap();

        let rows = svc.readings_in_range(RangeToken::Minute).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].temperature, Some(22.5));
        assert_eq!(rows[0].pressure, Some(1013.2));
        assert_eq!(rows[0].humidity, Some(45.0));
        assert_eq!(rows[0].gas_resistance, Some(50000.0));
    }

    #[tokio::test]
    async fn server_clock_stamps_readings_without_timestamp() {
        let svc = service();
        let before = Utc::now();
        svc.ingest(IncomingReading::default()).await.unwrap();
        let after = Utc::now();

        let rows = svc.readings_in_range(RangeToken::Minute).await.unwrap();
        assert!(rows[0].recorded_at >= before && rows[0].recorded_at <= after);
    }

    #[tokio::test]
    async fn partial_reading_keeps_missing_fields_empty() {
        let svc = service();
        svc.ingest(IncomingReading {
            humidity: Some(40.0),
            ..Default::default()
        })
        .await
        .unwrap();

        let rows = svc.readings_in_range(RangeToken::Minute).await.unwrap();
        assert_eq!(rows[0].humidity, Some(40.0));
        assert_eq!(rows[0].temperature, None);
        assert_eq!(rows[0].pressure, None);
        assert_eq!(rows[0].gas_resistance, None);
    }

    #[tokio::test]
    async fn each_token_selects_only_readings_inside_its_window() {
        let svc = service();
        let now = Utc::now();
        for (age_secs, temp) in [(30, 1.0), (600, 2.0), (7_200, 3.0), (172_800, 4.0), (1_209_600, 5.0)] {
            svc.ingest(at(now - TimeDelta::seconds(age_secs), temp)).await.unwrap();
        }

        let temps = |rows: Vec<Reading>| rows.iter().map(|r| r.temperature.unwrap()).collect::<Vec<_>>();

        let minute = svc.readings_in_range_at(RangeToken::Minute, now).await.unwrap();
        assert_eq!(temps(minute), vec![1.0]);
        let hour = svc.readings_in_range_at(RangeToken::Hour, now).await.unwrap();
        assert_eq!(temps(hour), vec![1.0, 2.0]);
        let day = svc.readings_in_range_at(RangeToken::Day, now).await.unwrap();
        assert_eq!(temps(day), vec![1.0, 2.0, 3.0]);
        let week = svc.readings_in_range_at(RangeToken::Week, now).await.unwrap();
        assert_eq!(temps(week), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn reading_exactly_at_window_edge_is_excluded() {
        let svc = service();
        let now = Utc::now();
        svc.ingest(at(now - TimeDelta::seconds(60), 1.0)).await.unwrap();

        let rows = svc.readings_in_range_at(RangeToken::Minute, now).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn reading_ages_out_of_minute_window() {
        let svc = service();
        let t0 = Utc::now();
        svc.ingest(at(t0, 22.5)).await.unwrap();

        let soon = svc
            .readings_in_range_at(RangeToken::Minute, t0 + TimeDelta::seconds(5))
            .await
            .unwrap();
        assert_eq!(soon.len(), 1);

        let later = svc
            .readings_in_range_at(RangeToken::Minute, t0 + TimeDelta::seconds(70))
            .await
            .unwrap();
        assert!(later.is_empty());
    }
}
