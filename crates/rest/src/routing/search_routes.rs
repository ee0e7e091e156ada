//! Search route configuration.

use axum::{Router, routing::get};

use crate::formatting::RecordFormatter;
use crate::handlers;
use crate::state::AppState;

/// Creates all routes of the search API.
///
/// # Routes
///
/// - `GET /rpn/` (and `/rpn`) - Structured (RPN) search
/// - `GET /` - Simple (CQL) search
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
pub fn create_routes<F>(state: AppState<F>) -> Router
where
    F: RecordFormatter + 'static,
{
    Router::new()
        .route("/", get(handlers::cql_search_handler::<F>))
        .route("/rpn/", get(handlers::rpn_search_handler::<F>))
        .route("/rpn", get(handlers::rpn_search_handler::<F>))
        .route("/health", get(handlers::health_handler::<F>))
        .route("/_liveness", get(handlers::liveness_handler))
        .with_state(state)
}
