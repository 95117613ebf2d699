//! Environment-variable configuration overlay (specification §6
//! "Environment variables... keys are snake-uppercased paths into the
//! configuration structure... Parsing is best-effort with explicit error
//! on malformed values").
//!
//! This module overlays the configuration blocks this crate can see
//! (`scheduler`, `execution`, `pipeline`). The `session`, `rate_limit`,
//! `adaptive`, and `retry` blocks live in crates this one does not depend
//! on; the facade crate applies their overlays using the same helpers
//! exposed here (see DESIGN.md).

use std::env::VarError;
use std::str::FromStr;
use std::time::Duration;

use loomcrawl_pipeline::PipelineConfig;
use loomcrawl_scheduler::SchedulerConfig;

use crate::config::{ExecutionConfig, LogLevel};
use crate::error::ConfigError;

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

/// Applies `LOOMCRAWL_SCHEDULER_*` overrides to `config`, leaving fields
/// unset in the environment untouched.
pub fn overlay_scheduler(config: &mut SchedulerConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<usize>("LOOMCRAWL_SCHEDULER_CONCURRENT_REQUESTS")? {
        config.concurrent_requests = v;
    }
    if let Some(v) = read::<usize>("LOOMCRAWL_SCHEDULER_PENDING_REQUESTS")? {
        config.pending_requests = v;
    }
    if let Some(v) = read::<usize>("LOOMCRAWL_SCHEDULER_READY_QUEUE_MAX_SIZE")? {
        config.ready_queue_max_size = v;
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_SCHEDULER_CLOSE_TIMEOUT_SECS")? {
        config.close_timeout = Duration::from_secs(v);
    }
    Ok(())
}

/// Applies `LOOMCRAWL_EXECUTION_*` overrides to `config`.
pub fn overlay_execution(config: &mut ExecutionConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<u64>("LOOMCRAWL_EXECUTION_TIMEOUT_SECS")? {
        config.timeout = Some(Duration::from_secs(v));
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_EXECUTION_SHUTDOWN_TIMEOUT_SECS")? {
        config.shutdown_timeout = Duration::from_secs(v);
    }
    if let Some(v) = read::<u64>("LOOMCRAWL_EXECUTION_SHUTDOWN_CHECK_INTERVAL_MS")? {
        config.shutdown_check_interval = Duration::from_millis(v);
    }
    if let Some(raw) = read::<String>("LOOMCRAWL_EXECUTION_LOG_LEVEL")? {
        config.log_level = match raw.to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            other => {
                return Err(ConfigError::MalformedEnvVar {
                    key: "LOOMCRAWL_EXECUTION_LOG_LEVEL".to_string(),
                    value: other.to_string(),
                    reason: "expected one of trace, debug, info, warn, error".to_string(),
                })
            }
        };
    }
    Ok(())
}

/// Applies `LOOMCRAWL_PIPELINE_*` overrides to `config`.
pub fn overlay_pipeline(config: &mut PipelineConfig) -> Result<(), ConfigError> {
    if let Some(v) = read::<bool>("LOOMCRAWL_PIPELINE_STRICT")? {
        config.strict = v;
    }
    Ok(())
}
