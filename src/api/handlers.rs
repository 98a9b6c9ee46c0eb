use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use tracing::warn;
use utoipa::OpenApi;

use super::{
    dto::{AddReadingRequest, MessageResponse, ReadingDto},
    errors::ApiError,
};
use crate::{range::RangeToken, service::ReadingService};

pub const ADD_SUCCESS: &str = "BME680 data added successfully!";

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// First `range` value in the query string. Repeated keys are tolerated and
/// anything after the first is ignored.
fn first_range(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "range")
        .map(|(_, value)| value.as_str())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Store one BME680 reading. Missing measurements are stored as null.
#[utoipa::path(
    post,
    path = "/add_bme680_data",
    request_body = AddReadingRequest,
    responses(
        (status = 200, description = "Reading stored", body = MessageResponse),
        (status = 500, description = "Payload rejected or storage failure", body = MessageResponse),
    ),
    tag = "bme680"
)]
pub async fn add_bme680_data(
    State(service): State<ReadingService>,
    payload: Result<Json<AddReadingRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected BME680 payload");
        ApiError::from(rejection)
    })?;

    service
        .ingest(request.into())
        .await
        .map_err(ApiError::Ingest)?;

    Ok(Json(MessageResponse::new(ADD_SUCCESS)))
}

/// Fetch every reading inside the requested lookback window, newest first.
#[utoipa::path(
    get,
    path = "/get_bme680_data",
    params(
        ("range" = Option<RangeToken>, Query, description = "Lookback window; unknown or missing values mean `minute`"),
    ),
    responses(
        (status = 200, description = "Readings, newest first", body = Vec<ReadingDto>),
        (status = 500, description = "Storage failure", body = MessageResponse),
    ),
    tag = "bme680"
)]
pub async fn get_bme680_data(
    State(service): State<ReadingService>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<ReadingDto>>, ApiError> {
    let range = RangeToken::from_param(first_range(&params));
    let rows = service
        .readings_in_range(range)
        .await
        .map_err(ApiError::Fetch)?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(add_bme680_data, get_bme680_data, health),
    components(schemas(AddReadingRequest, ReadingDto, MessageResponse, RangeToken)),
    tags(
        (name = "bme680", description = "BME680 ingestion and query endpoints"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "BME680 Reading Service",
        version = "0.1.0",
        description = "Stores BME680 environmental readings and serves time-windowed queries"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
