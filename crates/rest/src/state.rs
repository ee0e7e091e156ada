//! Application state for the search API.
//!
//! Holds the process-wide pieces every handler needs: the configuration and
//! the response pipeline (which in turn owns the SRU client, the formatter
//! and the worker pool).

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::formatting::RecordFormatter;
use crate::pipeline::ResponsePipeline;
use crate::worker_pool::WorkerPool;

/// Shared application state.
///
/// # Type Parameters
///
/// * `F` - The record formatter (must implement [`RecordFormatter`])
///
/// # Example
///
/// ```rust,ignore
/// use ess_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(pipeline, Arc::new(WorkerPool::current()), config);
/// ```
pub struct AppState<F> {
    /// Search pipeline.
    pipeline: Arc<ResponsePipeline<F>>,

    /// Worker pool shared with the pipeline.
    pool: Arc<WorkerPool>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// F only lives behind Arc, so it need not be Clone
impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            pool: Arc::clone(&self.pool),
            config: Arc::clone(&self.config),
        }
    }
}

impl<F: RecordFormatter + 'static> AppState<F> {
    /// Creates a new AppState.
    pub fn new(pipeline: ResponsePipeline<F>, pool: Arc<WorkerPool>, config: ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            pool,
            config: Arc::new(config),
        }
    }

    /// Returns the search pipeline.
    pub fn pipeline(&self) -> &ResponsePipeline<F> {
        &self.pipeline
    }

    /// Returns the worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
