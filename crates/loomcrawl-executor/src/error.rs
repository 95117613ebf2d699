//! Errors raised while configuring or running the executor.

/// Errors from applying the environment-variable overlay (specification
/// §6 "Parsing is best-effort with explicit error on malformed values").
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable matched a known configuration key but its
    /// value could not be parsed into the expected type.
    #[error("environment variable `{key}` has a malformed value `{value}`: {reason}")]
    MalformedEnvVar {
        /// The environment variable name, e.g. `LOOMCRAWL_SCHEDULER_CONCURRENT_REQUESTS`.
        key: String,
        /// The raw value that failed to parse.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

impl ConfigError {
    /// Returns `true` if this is a [`ConfigError::MalformedEnvVar`].
    pub fn is_malformed_env_var(&self) -> bool {
        matches!(self, ConfigError::MalformedEnvVar { .. })
    }
}

/// Errors from [`crate::Runner::run`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunnerError {
    /// Lifespan setup failed; the runner still ran teardown before
    /// returning this (specification §4.7 startup step 1).
    #[error(transparent)]
    Lifespan(#[from] crate::lifespan::LifespanError),
}

impl RunnerError {
    /// Returns `true` if this is a [`RunnerError::Lifespan`].
    pub fn is_lifespan(&self) -> bool {
        matches!(self, RunnerError::Lifespan(_))
    }
}
