//! Retry policy configuration (specification §4.4, §6).

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{ConstantInterval, ExponentialInterval, ExponentialJitterInterval, IntervalFunction, LinearInterval};

/// The upper bound on any delay computed from a `Retry-After` header,
/// matching `loomcrawl-ratelimiter`'s own cap.
pub const RETRY_AFTER_CAP: Duration = Duration::from_secs(600);

/// One of the four backoff shapes the specification names, as a
/// convenience for callers who would rather pick a strategy by name than
/// hand-build an [`IntervalFunction`].
#[derive(Debug, Clone)]
pub enum BackoffKind {
    Constant { base_delay: Duration },
    Linear { base_delay: Duration },
    Exponential { base_delay: Duration, max_delay: Duration },
    ExponentialJitter { base_delay: Duration, max_delay: Duration },
}

impl BackoffKind {
    fn build(&self) -> Arc<dyn IntervalFunction> {
        match *self {
            BackoffKind::Constant { base_delay } => Arc::new(ConstantInterval::new(base_delay)),
            BackoffKind::Linear { base_delay } => Arc::new(LinearInterval::new(base_delay)),
            BackoffKind::Exponential { base_delay, max_delay } => {
                Arc::new(ExponentialInterval::new(base_delay, max_delay))
            }
            BackoffKind::ExponentialJitter { base_delay, max_delay } => {
                Arc::new(ExponentialJitterInterval::new(base_delay, max_delay))
            }
        }
    }
}

/// Policy for the retry middleware.
#[derive(Clone)]
pub struct RetryConfig {
    pub(crate) max_attempts: u32,
    pub(crate) failure_statuses: Vec<u16>,
    pub(crate) retry_on_transport_error: bool,
    pub(crate) interval: Arc<dyn IntervalFunction>,
    pub(crate) stop_after_reenqueue: bool,
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` if `status` is a configured trigger condition.
    pub fn triggers_on_status(&self, status: http::StatusCode) -> bool {
        self.failure_statuses.contains(&status.as_u16())
    }

    /// The configured trigger status set, exposed so the rate limiter's
    /// own failure classification can inherit it when
    /// `adaptive.inherit_retry_triggers` is set (specification §6
    /// `adaptive` block).
    pub fn failure_statuses(&self) -> &[u16] {
        &self.failure_statuses
    }
}

/// Builds a [`RetryConfig`], defaulting to the specification's example
/// policy: 3 attempts, exponential backoff with jitter from 500ms up to
/// 30s, triggering on the common transient-failure status set plus any
/// network failure.
pub struct RetryConfigBuilder {
    max_attempts: u32,
    failure_statuses: Vec<u16>,
    retry_on_transport_error: bool,
    backoff: BackoffKind,
    stop_after_reenqueue: bool,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            failure_statuses: vec![429, 500, 502, 503, 504],
            retry_on_transport_error: true,
            backoff: BackoffKind::ExponentialJitter {
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(30),
            },
            stop_after_reenqueue: false,
        }
    }
}

impl RetryConfigBuilder {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn failure_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.failure_statuses = statuses.into();
        self
    }

    pub fn retry_on_transport_error(mut self, retry: bool) -> Self {
        self.retry_on_transport_error = retry;
        self
    }

    pub fn backoff(mut self, backoff: BackoffKind) -> Self {
        self.backoff = backoff;
        self
    }

    /// Uses a caller-supplied [`IntervalFunction`] instead of one of the
    /// named [`BackoffKind`]s.
    pub fn custom_interval(self, interval: Arc<dyn IntervalFunction>) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            failure_statuses: self.failure_statuses,
            retry_on_transport_error: self.retry_on_transport_error,
            interval,
            stop_after_reenqueue: self.stop_after_reenqueue,
        }
    }

    /// Raises `StopRequestProcessing` after a successful re-enqueue so no
    /// other exception middleware or errback observes the failed attempt.
    pub fn stop_after_reenqueue(mut self, stop: bool) -> Self {
        self.stop_after_reenqueue = stop;
        self
    }

    pub fn build(self) -> RetryConfig {
        let interval = self.backoff.build();
        RetryConfig {
            max_attempts: self.max_attempts,
            failure_statuses: self.failure_statuses,
            retry_on_transport_error: self.retry_on_transport_error,
            interval,
            stop_after_reenqueue: self.stop_after_reenqueue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_triggers_on_server_errors() {
        let config = RetryConfig::builder().build();
        assert!(config.triggers_on_status(http::StatusCode::SERVICE_UNAVAILABLE));
        assert!(!config.triggers_on_status(http::StatusCode::NOT_FOUND));
    }

    #[test]
    fn custom_backoff_overrides_default() {
        let config = RetryConfig::builder()
            .backoff(BackoffKind::Constant { base_delay: Duration::from_secs(1) })
            .build();
        assert_eq!(config.interval.next_interval(4), Duration::from_secs(1));
    }
}
