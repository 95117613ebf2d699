//! Typed configuration for the runner (specification §6 "execution" block).

use std::time::Duration;

/// Severity at which the runner logs a timeout-driven shutdown
/// (specification §6 "log_level: severity of timeout events").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Configuration for [`crate::Runner`], corresponding to the `execution`
/// configuration block.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Caps total runtime. When reached, the runner logs at `log_level`
    /// and initiates graceful shutdown, same as a SIGINT/SIGTERM.
    pub timeout: Option<Duration>,
    /// Grace period after a signal before escalating, mirrored here as
    /// the budget the runner itself waits before giving up on a clean
    /// drain and forcing shutdown (distinct from `scheduler.close_timeout`,
    /// which bounds only the scheduler's own drain).
    pub shutdown_timeout: Duration,
    /// How often the runner polls scheduler/pipeline drain state while
    /// waiting for the startup sequence's step 4 condition.
    pub shutdown_check_interval: Duration,
    /// Severity of timeout-driven shutdown log lines.
    pub log_level: LogLevel,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            shutdown_timeout: Duration::from_secs(30),
            shutdown_check_interval: Duration::from_millis(100),
            log_level: LogLevel::Info,
        }
    }
}

impl ExecutionConfig {
    pub fn builder() -> ExecutionConfigBuilder {
        ExecutionConfigBuilder::default()
    }
}

/// Builder for [`ExecutionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfigBuilder {
    config: ExecutionConfig,
}

impl ExecutionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total-runtime cap. `None` (the default) means unbounded.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn shutdown_check_interval(mut self, interval: Duration) -> Self {
        self.config.shutdown_check_interval = interval;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn build(self) -> ExecutionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_runtime_cap() {
        let config = ExecutionConfig::default();
        assert!(config.timeout.is_none());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn builder_sets_timeout() {
        let config = ExecutionConfigBuilder::new().timeout(Duration::from_secs(5)).build();
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
