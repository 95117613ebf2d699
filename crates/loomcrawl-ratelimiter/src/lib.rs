//! Per-group dispatch pacing, with optional EWMA+AIMD adaptation driven by
//! request outcomes.

pub mod config;
pub mod events;
pub mod group;
pub mod limiter;

pub use config::{AdaptiveConfig, RateLimiterConfig, RateLimiterConfigBuilder, RETRY_AFTER_CAP};
pub use events::{AdaptReason, RateLimiterEvent};
pub use group::{GroupKey, GroupKeyFn, GroupSource, HostGroupKeyFn};
pub use limiter::{Outcome, RateLimiter};
