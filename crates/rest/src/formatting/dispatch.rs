//! Concurrent formatting of a result page.
//!
//! One task is spawned per record into a request-scoped [`TaskGroup`]. Records
//! that already failed classification travel as [`FormatJob::Placeholder`] so
//! that every record keeps its slot in the output.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::error::{GatewayError, GatewayResult, INTERNAL_ERROR_MESSAGE};
use crate::worker_pool::{TaskGroup, WorkerPool};

use super::{FormatRequest, FormattedRecord, RecordFormatter};

/// Work for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatJob {
    /// Call the formatter.
    Format(FormatRequest),
    /// Emit an error placeholder without calling the formatter.
    Placeholder {
        /// Message inside the placeholder.
        message: String,
    },
}

impl FormatJob {
    /// Placeholder with the generic error message.
    pub fn failed() -> Self {
        FormatJob::Placeholder {
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Fans records out to a [`RecordFormatter`] and collects them in order.
pub struct FormattingDispatcher<F> {
    formatter: Arc<F>,
    pool: Arc<WorkerPool>,
    deadline: Option<Duration>,
}

impl<F> Clone for FormattingDispatcher<F> {
    fn clone(&self) -> Self {
        Self {
            formatter: Arc::clone(&self.formatter),
            pool: Arc::clone(&self.pool),
            deadline: self.deadline,
        }
    }
}

impl<F: RecordFormatter + 'static> FormattingDispatcher<F> {
    /// Creates a dispatcher. `deadline` bounds the whole fan-in; `None`
    /// waits for every task.
    pub fn new(formatter: Arc<F>, pool: Arc<WorkerPool>, deadline: Option<Duration>) -> Self {
        Self {
            formatter,
            pool,
            deadline,
        }
    }

    /// The shared formatter.
    pub fn formatter(&self) -> &Arc<F> {
        &self.formatter
    }

    /// Runs every job and returns one record per job, in job order.
    ///
    /// A formatter failure degrades that record to a placeholder. Failing to
    /// collect the results (panic, deadline, pool shut down) fails the whole
    /// page.
    pub async fn dispatch(
        &self,
        jobs: Vec<FormatJob>,
        tracking_id: &str,
    ) -> GatewayResult<Vec<FormattedRecord>> {
        let mut group: TaskGroup<FormattedRecord> =
            self.pool.task_group().map_err(|e| GatewayError::Assembly {
                message: e.to_string(),
            })?;

        for job in jobs {
            match job {
                FormatJob::Format(request) => {
                    let formatter = Arc::clone(&self.formatter);
                    group.spawn(async move { format_one(formatter.as_ref(), request).await });
                }
                FormatJob::Placeholder { message } => {
                    group.spawn(async move { FormattedRecord::placeholder(message) });
                }
            }
        }

        debug!(
            tracking_id = %tracking_id,
            tasks = group.len(),
            formatter = self.formatter.formatter_name(),
            "Dispatched formatting tasks"
        );

        group.join_ordered(self.deadline).await.map_err(|e| {
            error!(tracking_id = %tracking_id, error = %e, "Could not collect formatted records");
            GatewayError::Assembly {
                message: e.to_string(),
            }
        })
    }
}

async fn format_one<F: RecordFormatter + ?Sized>(
    formatter: &F,
    request: FormatRequest,
) -> FormattedRecord {
    match formatter.format(&request).await {
        Ok(element) => FormattedRecord::Element(element),
        Err(e) => {
            error!(
                tracking_id = %request.tracking_id,
                id = %request.identifier,
                format = %request.output_format,
                error = %e,
                "Formatting failed"
            );
            FormattedRecord::placeholder(INTERNAL_ERROR_MESSAGE)
        }
    }
}
