//! Errors raised by the scheduler.

/// Errors that can be returned from [`crate::Scheduler::submit`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulerError {
    /// `submit` was called after `close` (idempotently) stopped intake.
    #[error("scheduler is shutting down, no new requests are accepted")]
    ShutdownInProgress,

    /// The ready queue's hard cap (`ready_queue_max_size`) was reached.
    #[error("ready queue is full (max size {max_size})")]
    QueueFull {
        /// The configured hard cap that was hit.
        max_size: usize,
    },
}

impl SchedulerError {
    /// Returns `true` if submission was rejected because of shutdown.
    pub fn is_shutdown_in_progress(&self) -> bool {
        matches!(self, SchedulerError::ShutdownInProgress)
    }

    /// Returns `true` if submission was rejected because the queue is full.
    pub fn is_queue_full(&self) -> bool {
        matches!(self, SchedulerError::QueueFull { .. })
    }
}
