use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ErrorResponse;
use crate::openapi::swagger_ui;
use crate::weather::handlers as weather_handlers;
use crate::AppState;

/// Upper bound for a whole inbound request, including the three upstream calls
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Middleware failures answer like every other failure: 500 with a JSON message
async fn handle_middleware_error(err: BoxError) -> Response {
    let message = if err.is::<tower::timeout::error::Elapsed>() {
        "Request timed out".to_string()
    } else {
        format!("Internal error: {}", err)
    };

    tracing::error!(error = %message, "Request failed in middleware");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
        .into_response()
}

/// Build the weather API routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/api/weather", get(weather_handlers::get_weather))
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        // Health check at root level
        .route("/", get(weather_handlers::health))
        .route("/health", get(weather_handlers::health))
        .merge(weather_routes())
        // Swagger UI for API documentation
        .merge(swagger_ui())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
