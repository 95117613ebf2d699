//! Environment-variable configuration overlay for the configuration
//! blocks `loomcrawl-executor::env` cannot see: `rate_limit`, `adaptive`,
//! `retry`, and this crate's own `session` block (specification §6).
//!
//! Uses the same best-effort-parse-with-explicit-error contract as
//! `loomcrawl_executor::env`, duplicated here rather than shared because
//! the executor's `read` helper is private to that crate.

use std::env::VarError;
use std::str::FromStr;
use std::time::Duration;

use loomcrawl_executor::ConfigError;
use loomcrawl_ratelimiter::{AdaptiveConfig, RateLimiterConfig};

use crate::session::SessionConfig;

fn read<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::MalformedEnvVar { key: key.to_string(), value, reason: e.to_string() }),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::MalformedEnvVar {
            key: key.to_string(),
            value: "<non-unicode>".to_string(),
            reason: "environment variable is not valid Unicode".to_string(),
        }),
    }
}

/// Applies `LOOMCRAWL_RATE_LIMIT_*` and, when adaptive mode is already
/// enabled, `LOOMCRAWL_ADAPTIVE_*` overrides.
pub fn overlay_rate_limiter(config: &mut RateLimiterConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<bool>("LOOMCRAWL_RATE_LIMIT_ENABLED")? {
        config.enabled = v;
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_RATE_LIMIT_DEFAULT_INTERVAL_MS")? {
        config.default_interval = Duration::from_millis(v);
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_RATE_LIMIT_CLEANUP_TIMEOUT_SECS")? {
        config.cleanup_timeout = Duration::from_secs(v);
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_RATE_LIMIT_CLEANUP_INTERVAL_SECS")? {
        config.cleanup_interval = Duration::from_secs(v);
    }
    if let Some(adaptive) = &mut config.adaptive {
        overlay_adaptive(adaptive)?;
    }
    Ok(())
}

/// Applies `LOOMCRAWL_ADAPTIVE_*` overrides to an already-enabled
/// [`AdaptiveConfig`].
pub fn overlay_adaptive(config: &mut AdaptiveConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<u64>("LOOMCRAWL_ADAPTIVE_MIN_INTERVAL_MS")? {
        config.min_interval = Duration::from_millis(v);
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_ADAPTIVE_MAX_INTERVAL_MS")? {
        config.max_interval = Duration::from_millis(v);
    }
    if let Some(v) = read::<f64>("LOOMCRAWL_ADAPTIVE_INCREASE_FACTOR")? {
        config.increase_factor = v;
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_ADAPTIVE_DECREASE_STEP_MS")? {
        config.decrease_step = Duration::from_millis(v);
    }
    if let Some(v) = read::<u32>("LOOMCRAWL_ADAPTIVE_SUCCESS_THRESHOLD")? {
        config.success_threshold = v;
    }
    if let Some(v) = read::<f64>("LOOMCRAWL_ADAPTIVE_EWMA_ALPHA")? {
        config.ewma_alpha = v;
    }
    if let Some(v) = read::<bool>("LOOMCRAWL_ADAPTIVE_RESPECT_RETRY_AFTER")? {
        config.respect_retry_after = v;
    }
    Ok(())
}

/// Applies `LOOMCRAWL_RETRY_*` overrides to a [`loomcrawl_retry::RetryConfigBuilder`].
/// Returns a builder rather than mutating a built [`loomcrawl_retry::RetryConfig`]
/// in place, since that type's fields are private outside its own crate.
#[cfg(feature = "retry")]
pub fn overlay_retry(
    mut builder: loomcrawl_retry::RetryConfigBuilder,
) -> Result<loomcrawl_retry::RetryConfigBuilder, ConfigError> {
    if let Some(v) = read::<u32>("LOOMCRAWL_RETRY_MAX_ATTEMPTS")? {
        builder = builder.max_attempts(v);
    }
    if let Some(v) = read::<bool>("LOOMCRAWL_RETRY_RETRY_ON_TRANSPORT_ERROR")? {
        builder = builder.retry_on_transport_error(v);
    }
    if let Some(v) = read::<bool>("LOOMCRAWL_RETRY_STOP_AFTER_REENQUEUE")? {
        builder = builder.stop_after_reenqueue(v);
    }
    Ok(builder)
}

/// Applies `LOOMCRAWL_SESSION_*` overrides to `config`.
pub fn overlay_session(config: &mut SessionConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<u64>("LOOMCRAWL_SESSION_TIMEOUT_SECS")? {
        config.timeout = Duration::from_secs(v);
    }
    if let Some(v) = read::<bool>("LOOMCRAWL_SESSION_TLS_VERIFY")? {
        config.tls_verify = v;
    }
    if let Some(v) = read::<String>("LOOMCRAWL_SESSION_PROXY")? {
        config.proxy = Some(v.parse().map_err(|e: url::ParseError| ConfigError::MalformedEnvVar {
            key: "LOOMCRAWL_SESSION_PROXY".to_string(),
            value: v,
            reason: e.to_string(),
        })?);
    }
    if let Some(v) = read::<String>("LOOMCRAWL_SESSION_USER_AGENT")? {
        config.user_agent = Some(v);
    }
    Ok(())
}
