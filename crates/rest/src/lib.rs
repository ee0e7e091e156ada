//! # ess-rest - External Search Service
//!
//! An HTTP gateway that turns simple search requests into SRU
//! `searchRetrieve` calls against a backend proxy, formats every returned
//! record concurrently through a formatting collaborator and answers with a
//! single `essResponse` XML document.
//!
//! ## Request Flow
//!
//! 1. Parameters are normalized: paging defaults and limits, a generated
//!    tracking id, and a check of the base against the configured set.
//! 2. The SRU backend is called once per request.
//! 3. Each record is classified and its identifier extracted from the first
//!    `controlfield` with `tag="001"`.
//! 4. Records are formatted concurrently on the shared worker pool and
//!    reassembled in backend order. A record that cannot be formatted becomes
//!    `<error>Internal Server Error</error>` in its slot.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ess_rest::{ServerConfig, WorkerPool, create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env();
//!     let pool = Arc::new(WorkerPool::current());
//!     let app = create_app(pool, config.clone())?;
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | HTTP Method | URL Pattern |
//! |----------|-------------|-------------|
//! | structured search | GET | `/rpn/?base=&query=&start=&rows=&format=&trackingId=` |
//! | simple search | GET | `/?base=&query=&start=&rows=&format=&trackingId=` |
//! | health | GET | `/health` |
//! | liveness | GET | `/_liveness` |
//!
//! ## Error Handling
//!
//! | HTTP Status | Body | Cause |
//! |-------------|------|-------|
//! | 400 | `Missing required parameter: <name>` | `base`, `query` or `format` absent |
//! | 400 | `Invalid value for parameter: <name>` | `start` or `rows` not a number |
//! | 500 | `Unknown base requested` | base not configured |
//! | 500 | `Internal Server Error` | backend or assembly failure, or the request timeout |
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration
//! - [`error`] - Error types and HTTP mapping
//! - [`query`] - Parameter normalization
//! - [`sru`] - SRU client and response parser
//! - [`records`] - Record classification and identifier extraction
//! - [`formatting`] - Formatter trait, HTTP formatter and concurrent dispatch
//! - [`worker_pool`] - Shared pool and request-scoped task groups
//! - [`pipeline`] - The request pipeline
//! - [`responses`] - The `essResponse` document
//! - [`handlers`] - HTTP handlers
//! - [`routing`] - Route configuration
//! - [`state`] - Application state

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod formatting;
pub mod handlers;
pub mod pipeline;
pub mod query;
pub mod records;
pub mod responses;
pub mod routing;
pub mod sru;
pub mod state;
pub mod worker_pool;
pub mod xml;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{GatewayError, GatewayResult, InitError};
pub use formatting::{OpenFormatClient, RecordFormatter};
pub use pipeline::ResponsePipeline;
pub use state::AppState;
pub use worker_pool::WorkerPool;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, error_handling::HandleErrorLayer, response::IntoResponse};
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::formatting::FormattingDispatcher;
use crate::query::QueryNormalizer;
use crate::records::RecordIdentifierResolver;
use crate::sru::SruClient;

/// Added to the request timeout for the outer layer. The pipeline deadline
/// fires first, with the tracking id in scope.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Creates the Axum application with the HTTP formatting service.
///
/// The formatter is an [`OpenFormatClient`] pointed at
/// `config.open_format_url`. For a custom formatter use
/// [`create_app_with_config`].
pub fn create_app(pool: Arc<WorkerPool>, config: ServerConfig) -> Result<Router, InitError> {
    let formatter = OpenFormatClient::new(&config.open_format_url, config.formatting_timeout())?;
    create_app_with_config(Arc::new(formatter), pool, config)
}

/// Creates the Axum application with a custom formatter.
///
/// # Arguments
///
/// * `formatter` - Formats each record
/// * `pool` - Worker pool shared by all requests
/// * `config` - Server configuration
///
/// # Example
///
/// ```rust,ignore
/// use ess_rest::{ServerConfig, WorkerPool, create_app_with_config};
///
/// let config = ServerConfig {
///     bases: vec!["bibdk".to_string()],
///     ..Default::default()
/// };
/// let app = create_app_with_config(Arc::new(MyFormatter), Arc::new(WorkerPool::current()), config)?;
/// ```
pub fn create_app_with_config<F>(
    formatter: Arc<F>,
    pool: Arc<WorkerPool>,
    config: ServerConfig,
) -> Result<Router, InitError>
where
    F: RecordFormatter + 'static,
{
    info!(
        formatter = formatter.formatter_name(),
        sru_target = %config.sru_target_url,
        bases = ?config.bases,
        "Creating search gateway"
    );

    let state = build_state(formatter, pool, config.clone())?;
    let router = routing::create_routes(state);

    let outer_limit = config.request_timeout() + TIMEOUT_GRACE;
    let service_builder = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(HandleErrorLayer::new(move |err: BoxError| async move {
            error!(error = %err, limit = ?outer_limit, "Request aborted by server timeout");
            GatewayError::RequestTimeout { limit: outer_limit }.into_response()
        }))
        .layer(TimeoutLayer::new(outer_limit));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    Ok(router.layer(service_builder))
}

/// Wires the pipeline and application state from configuration.
pub fn build_state<F>(
    formatter: Arc<F>,
    pool: Arc<WorkerPool>,
    config: ServerConfig,
) -> Result<AppState<F>, InitError>
where
    F: RecordFormatter + 'static,
{
    let normalizer = QueryNormalizer::new(config.bases.iter().cloned(), config.max_page_size);
    let sru = SruClient::new(&config.sru_target_url, config.backend_timeout())?;
    let resolver = RecordIdentifierResolver::new(config.identifier_prefix.as_str());
    info!(identifier_prefix = ?resolver.prefix(), "Record identifiers configured");
    let dispatcher = FormattingDispatcher::new(
        formatter,
        Arc::clone(&pool),
        Some(config.formatting_timeout()),
    );
    let pipeline = ResponsePipeline::new(normalizer, sru, resolver, dispatcher)
        .with_deadline(config.request_timeout());
    Ok(AppState::new(pipeline, pool, config))
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ess_rest={},tower_http=debug", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
