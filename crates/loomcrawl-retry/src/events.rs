//! Diagnostic events emitted by the retry middleware.

use std::time::{Duration, Instant};

use loomcrawl_core::EngineEvent;

#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry was scheduled: `attempt` is the re-submission's new
    /// attempt count, `delay` is how long the middleware slept first.
    Scheduled { id: u64, attempt: u32, delay: Duration, timestamp: Instant },
    /// `max_attempts` was reached; the failure passes through unchanged.
    Exhausted { id: u64, attempt: u32, timestamp: Instant },
}

impl EngineEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Scheduled { .. } => "scheduled",
            RetryEvent::Exhausted { .. } => "exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Scheduled { timestamp, .. } | RetryEvent::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "retry"
    }
}
