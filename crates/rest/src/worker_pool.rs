//! Shared worker pool for per-record work.
//!
//! The pool is created once at startup and handed to the application state.
//! Every request opens its own [`TaskGroup`] on it; the group owns the tasks
//! it spawned, so dropping the group (client went away, request failed,
//! deadline hit) aborts whatever is still running.
//!
//! The pool does not bound the number of tasks. Slow formatters therefore pile
//! up tasks until the per-request deadline passed to
//! [`TaskGroup::join_ordered`] expires.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Why a task group could not deliver its results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// The pool was shut down before or while the group ran.
    #[error("worker pool is shut down")]
    PoolShutDown,

    /// The deadline expired before every task finished.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// A task panicked.
    #[error("a task panicked")]
    Panicked,

    /// A task was cancelled from outside the group.
    #[error("task was cancelled: {message}")]
    Cancelled {
        /// Join error reported by the runtime.
        message: String,
    },
}

/// A process-wide pool that request task groups spawn onto.
#[derive(Debug)]
pub struct WorkerPool {
    handle: Handle,
    shutdown: watch::Sender<bool>,
}

impl WorkerPool {
    /// Creates a pool that spawns onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { handle, shutdown }
    }

    /// Creates a pool on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Opens a new task group, or fails when the pool is shut down.
    pub fn task_group<T: Send + 'static>(&self) -> Result<TaskGroup<T>, GroupError> {
        if self.is_shut_down() {
            return Err(GroupError::PoolShutDown);
        }
        Ok(TaskGroup {
            tasks: JoinSet::new(),
            handle: self.handle.clone(),
            shutdown: self.shutdown.subscribe(),
            len: 0,
        })
    }

    /// Stops accepting new groups and cancels the running ones.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!("Worker pool shut down");
        }
    }

    /// Returns true once [`WorkerPool::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Tasks spawned for one request.
///
/// Results are handed back in spawn order regardless of completion order.
#[derive(Debug)]
pub struct TaskGroup<T> {
    tasks: JoinSet<(usize, T)>,
    handle: Handle,
    shutdown: watch::Receiver<bool>,
    len: usize,
}

impl<T: Send + 'static> TaskGroup<T> {
    /// Spawns `task` and returns its position in the result list.
    pub fn spawn<F>(&mut self, task: F) -> usize
    where
        F: Future<Output = T> + Send + 'static,
    {
        let index = self.len;
        self.tasks
            .spawn_on(async move { (index, task.await) }, &self.handle);
        self.len += 1;
        index
    }

    /// Number of tasks spawned so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing was spawned.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Waits for every task and returns the results in spawn order.
    ///
    /// On any failure the remaining tasks are aborted.
    pub async fn join_ordered(self, deadline: Option<Duration>) -> Result<Vec<T>, GroupError> {
        let TaskGroup {
            mut tasks,
            mut shutdown,
            len,
            ..
        } = self;

        let collect = async {
            let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, value)) => slots[index] = Some(value),
                    Err(e) if e.is_panic() => return Err(GroupError::Panicked),
                    Err(e) => {
                        return Err(GroupError::Cancelled {
                            message: e.to_string(),
                        });
                    }
                }
            }
            slots
                .into_iter()
                .map(|slot| {
                    slot.ok_or_else(|| GroupError::Cancelled {
                        message: "task finished without a result".to_string(),
                    })
                })
                .collect::<Result<Vec<T>, GroupError>>()
        };

        let bounded = async {
            match deadline {
                Some(limit) => tokio::time::timeout(limit, collect)
                    .await
                    .unwrap_or(Err(GroupError::DeadlineExceeded(limit))),
                None => collect.await,
            }
        };

        let result = tokio::select! {
            result = bounded => result,
            _ = shutdown.wait_for(|down| *down) => Err(GroupError::PoolShutDown),
        };

        if result.is_err() {
            debug!(tasks = len, "Aborting task group");
        }
        result
    }
}
