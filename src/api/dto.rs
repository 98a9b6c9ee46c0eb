use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{db::models::Reading, service::IncomingReading};

/// Body of `POST /add_bme680_data`.
///
/// Every field is optional; unknown fields are ignored so newer firmware can
/// send extra data without breaking ingestion.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddReadingRequest {
    /// Degrees Celsius
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Hectopascals
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Relative humidity percentage
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Ohms
    #[serde(default)]
    pub gas_resistance: Option<f64>,
    /// Sample time. RFC 3339, or a naive ISO-8601 date-time taken as UTC.
    /// The server clock is used when absent.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    #[schema(value_type = Option<String>, example = "2024-06-01T12:00:00")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<AddReadingRequest> for IncomingReading {
    fn from(r: AddReadingRequest) -> Self {
        Self {
            temperature: r.temperature,
            pressure: r.pressure,
            humidity: r.humidity,
            gas_resistance: r.gas_resistance,
            timestamp: r.timestamp,
        }
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// One element of the `GET /get_bme680_data` array.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingDto {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Hectopascals
    pub pressure: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Ohms
    pub gas_resistance: Option<f64>,
    /// UTC, ISO-8601 without offset, e.g. `2024-06-01T12:00:00.250000`.
    pub timestamp: String,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            temperature: r.temperature,
            pressure: r.pressure,
            humidity: r.humidity,
            gas_resistance: r.gas_resistance,
            timestamp: format_timestamp(r.recorded_at),
        }
    }
}

/// Seconds precision when the sub-second part is zero, microseconds
/// otherwise. No timezone suffix.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    let naive = ts.naive_utc();
    let micros = naive.nanosecond() / 1_000;
    if micros == 0 {
        naive.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        format!("{}.{micros:06}", naive.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// `{"message": "..."}` body used by both endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
