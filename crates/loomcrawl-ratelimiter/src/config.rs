//! Typed configuration for the rate limiter, built with the same
//! `XConfig` + `XConfigBuilder` pattern used throughout loomcrawl.

use std::time::Duration;

/// Adaptive (EWMA+AIMD) tuning knobs, corresponding to the `adaptive`
/// configuration block.
#[derive(Debug, Clone)]
pub struct AdaptiveConfig {
    /// Lower bound for a group's adapted interval.
    pub min_interval: Duration,
    /// Upper bound for a group's adapted interval.
    pub max_interval: Duration,
    /// Multiplicative factor applied to `I` on a failure trigger.
    pub increase_factor: f64,
    /// Fixed amount subtracted from `I` once `success_threshold`
    /// consecutive successes accumulate.
    pub decrease_step: Duration,
    /// Number of consecutive successes required before decreasing `I`.
    pub success_threshold: u32,
    /// Smoothing factor for the latency EWMA, in `(0, 1]`.
    pub ewma_alpha: f64,
    /// Whether a `Retry-After` header is allowed to override `I` directly.
    pub respect_retry_after: bool,
    /// Whether this group inherits the retry subsystem's configured
    /// failure-trigger statuses/exception kinds as its own failure
    /// triggers.
    pub inherit_retry_triggers: bool,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(50),
            max_interval: Duration::from_secs(60),
            increase_factor: 2.0,
            decrease_step: Duration::from_millis(100),
            success_threshold: 10,
            ewma_alpha: 0.3,
            respect_retry_after: true,
            inherit_retry_triggers: true,
        }
    }
}

/// Cap applied to any `Retry-After` value before it can influence a
/// group's interval, per spec.
pub const RETRY_AFTER_CAP: Duration = Duration::from_secs(600);

/// Configuration for [`crate::RateLimiter`], corresponding to the
/// `rate_limit` configuration block.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Whether rate limiting is active at all. When `false`, `acquire`
    /// always returns immediately.
    pub enabled: bool,
    /// Interval used for a group on first sight, absent an override.
    pub default_interval: Duration,
    /// Whether adaptive (EWMA+AIMD) mode is active; when `false` the
    /// limiter runs in fixed mode only.
    pub adaptive: Option<AdaptiveConfig>,
    /// How long a group may sit idle before its state is evicted.
    pub cleanup_timeout: Duration,
    /// How often the eviction sweep runs.
    pub cleanup_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_interval: Duration::from_millis(200),
            adaptive: Some(AdaptiveConfig::default()),
            cleanup_timeout: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Builder for [`RateLimiterConfig`].
#[derive(Debug, Clone, Default)]
pub struct RateLimiterConfigBuilder {
    config: RateLimiterConfig,
}

impl RateLimiterConfigBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the limiter is enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Sets the default per-group interval.
    pub fn default_interval(mut self, interval: Duration) -> Self {
        self.config.default_interval = interval;
        self
    }

    /// Sets the adaptive tuning parameters, enabling adaptive mode.
    pub fn adaptive(mut self, adaptive: AdaptiveConfig) -> Self {
        self.config.adaptive = Some(adaptive);
        self
    }

    /// Disables adaptive mode, leaving the limiter in fixed mode.
    pub fn fixed_mode(mut self) -> Self {
        self.config.adaptive = None;
        self
    }

    /// Sets how long an idle group survives before eviction.
    pub fn cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.config.cleanup_timeout = timeout;
        self
    }

    /// Sets how often the eviction sweep runs.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RateLimiterConfig {
        self.config
    }
}
