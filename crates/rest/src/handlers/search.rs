//! Search handlers.
//!
//! Both routes take the same parameters and differ only in how the backend
//! is told to interpret the query.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::formatting::RecordFormatter;
use crate::query::{QueryLanguage, SearchParams};
use crate::state::AppState;

/// Handler for structured (RPN) searches.
///
/// # HTTP Request
///
/// `GET /rpn/?base=&query=&start=&rows=&format=&trackingId=`
///
/// # Response
///
/// - `200 OK` - `essResponse` document
/// - `400 Bad Request` - missing or unparsable parameter
/// - `500 Internal Server Error` - unknown base or backend failure
pub async fn rpn_search_handler<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    F: RecordFormatter + 'static,
{
    search(state, params, QueryLanguage::Rpn).await
}

/// Handler for simple (CQL) searches.
///
/// # HTTP Request
///
/// `GET /?base=&query=&start=&rows=&format=&trackingId=`
pub async fn cql_search_handler<F>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    F: RecordFormatter + 'static,
{
    search(state, params, QueryLanguage::Cql).await
}

async fn search<F>(state: AppState<F>, params: SearchParams, language: QueryLanguage) -> Response
where
    F: RecordFormatter + 'static,
{
    debug!(language = %language, base = ?params.base, "Processing search request");
    match state.pipeline().run(params, language).await {
        Ok(response) => response.into_response(),
        Err(failure) => failure.into_response(),
    }
}
