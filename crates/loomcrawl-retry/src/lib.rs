//! Retry middleware and backoff strategies for loomcrawl.

pub mod backoff;
pub mod config;
pub mod events;
pub mod middleware;

pub use backoff::{ConstantInterval, ExponentialInterval, ExponentialJitterInterval, IntervalFunction, LinearInterval};
pub use config::{BackoffKind, RetryConfig, RetryConfigBuilder, RETRY_AFTER_CAP};
pub use events::RetryEvent;
pub use middleware::RetryMiddleware;
