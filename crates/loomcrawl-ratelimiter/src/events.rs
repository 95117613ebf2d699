//! Diagnostic events emitted by the rate limiter.

use loomcrawl_core::EngineEvent;
use std::time::{Duration, Instant};

use crate::group::GroupKey;

/// An event emitted by [`crate::RateLimiter`] for observability.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A caller was made to wait before dispatching.
    Acquired {
        /// The group that was acquired.
        group: GroupKey,
        /// How long the caller waited.
        waited: Duration,
        /// The group's current interval after this acquire.
        interval: Duration,
        timestamp: Instant,
    },
    /// A group's interval was adapted in response to an outcome.
    IntervalAdapted {
        group: GroupKey,
        previous: Duration,
        current: Duration,
        reason: AdaptReason,
        timestamp: Instant,
    },
    /// A group's smoothed latency was updated.
    LatencyObserved {
        group: GroupKey,
        ewma: Duration,
        timestamp: Instant,
    },
    /// A group was evicted for being idle past `cleanup_timeout`.
    GroupEvicted { group: GroupKey, timestamp: Instant },
}

/// Why a group's interval changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptReason {
    /// A `Retry-After` header overrode the interval directly.
    RetryAfterOverride,
    /// A failure trigger multiplicatively increased the interval.
    FailureIncrease,
    /// Enough consecutive successes accumulated to decrease the interval.
    SuccessDecrease,
}

impl EngineEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::Acquired { .. } => "acquired",
            RateLimiterEvent::IntervalAdapted { .. } => "interval_adapted",
            RateLimiterEvent::LatencyObserved { .. } => "latency_observed",
            RateLimiterEvent::GroupEvicted { .. } => "group_evicted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::Acquired { timestamp, .. }
            | RateLimiterEvent::IntervalAdapted { timestamp, .. }
            | RateLimiterEvent::LatencyObserved { timestamp, .. }
            | RateLimiterEvent::GroupEvicted { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "rate_limiter"
    }
}
