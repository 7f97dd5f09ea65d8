use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;

use super::models::WeatherPayload;
use super::service::WeatherError;
use crate::error::ErrorResponse;
use crate::AppState;

/// Shared caches may keep the payload for 30 minutes and revalidate in the background
pub const PAYLOAD_CACHE_CONTROL: &str = "s-maxage=1800, stale-while-revalidate";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Get the normalized weather payload for the configured location
///
/// GET /api/weather
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "weather",
    responses(
        (status = 200, description = "Normalized weather payload", body = WeatherPayload),
        (status = 500, description = "Missing API key or upstream failure", body = ErrorResponse)
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, WeatherError> {
    let payload = state.weather_service.get_weather().await?;

    Ok((
        [(header::CACHE_CONTROL, PAYLOAD_CACHE_CONTROL)],
        Json(payload),
    ))
}
