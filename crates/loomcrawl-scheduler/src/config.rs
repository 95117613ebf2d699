//! Typed configuration for the scheduler.

use std::time::Duration;

/// Configuration for [`crate::Scheduler`], corresponding to the
/// `scheduler` configuration block.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of long-lived worker tasks.
    pub concurrent_requests: usize,
    /// Soft backpressure cap: producers are throttled once the heap plus
    /// in-flight set reaches this size.
    pub pending_requests: usize,
    /// Hard cap on the ready queue; `submit` fails immediately once the
    /// heap itself reaches this size, rather than suspending.
    pub ready_queue_max_size: usize,
    /// How long `close` waits for in-flight workers before cancelling them.
    pub close_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 16,
            pending_requests: 256,
            ready_queue_max_size: 10_000,
            close_timeout: Duration::from_secs(30),
        }
    }
}

/// Builder for [`SchedulerConfig`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker pool size.
    pub fn concurrent_requests(mut self, count: usize) -> Self {
        self.config.concurrent_requests = count;
        self
    }

    /// Sets the soft backpressure cap.
    pub fn pending_requests(mut self, count: usize) -> Self {
        self.config.pending_requests = count;
        self
    }

    /// Sets the hard cap on the ready queue.
    pub fn ready_queue_max_size(mut self, size: usize) -> Self {
        self.config.ready_queue_max_size = size;
        self
    }

    /// Sets the graceful-shutdown drain budget.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
