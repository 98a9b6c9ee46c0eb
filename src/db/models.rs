use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored BME680 sample. Measurements are SI values as reported by the
/// sensor; any of them may be missing when the device failed to read it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    /// Store-assigned, increasing in insertion order.
    pub id: i64,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Hectopascals
    pub pressure: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Ohms
    pub gas_resistance: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Insert input: a `Reading` without its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_resistance: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl NewReading {
    pub fn into_reading(self, id: i64) -> Reading {
        Reading {
            id,
            temperature: self.temperature,
            pressure: self.pressure,
            humidity: self.humidity,
            gas_resistance: self.gas_resistance,
            recorded_at: self.recorded_at,
        }
    }
}
