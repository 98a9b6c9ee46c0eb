use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::MessageResponse;
use crate::store::StoreError;

pub const INSERT_FAILED: &str = "Failed to insert BME680 data";
pub const FETCH_FAILED: &str = "Failed to fetch data";
pub const CONNECT_FAILED: &str = "Failed to connect to database";

/// Every way a request can fail, and the only place that decides what the
/// client sees for it.
#[derive(Debug)]
pub enum ApiError {
    /// The ingest body was not a usable reading.
    InvalidPayload(String),
    Ingest(StoreError),
    Fetch(StoreError),
}

impl ApiError {
    /// Existing producers and the dashboard only understand 500 for any
    /// failure, bad payloads included.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::Ingest(_) | Self::Fetch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ingest(e) | Self::Fetch(e) if e.is_unavailable() => CONNECT_FAILED,
            Self::InvalidPayload(_) | Self::Ingest(_) => INSERT_FAILED,
            Self::Fetch(_) => FETCH_FAILED,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(MessageResponse::new(self.message()));
        (self.status(), body).into_response()
    }
}
