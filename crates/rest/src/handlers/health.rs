//! Health check endpoint handlers.
//!
//! Provides simple health endpoints for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::formatting::RecordFormatter;
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// - `200 OK` - Server is healthy
/// - `503 Service Unavailable` - The worker pool has been shut down
pub async fn health_handler<F>(State(state): State<AppState<F>>) -> Response
where
    F: RecordFormatter + 'static,
{
    debug!("Processing health check request");

    let (status, label) = if state.pool().is_shut_down() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting-down")
    } else {
        (StatusCode::OK, "healthy")
    };

    let body = serde_json::json!({
        "status": label,
        "bases": state.config().bases,
        "formatter": state.pipeline().formatter_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (status, Json(body)).into_response()
}

/// Handler for a liveness probe.
///
/// # HTTP Request
///
/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
