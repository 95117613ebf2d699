//! Diagnostic events emitted by the scheduler.

use loomcrawl_core::EngineEvent;
use std::time::Instant;

/// An event emitted by [`crate::Scheduler`] for observability.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// A request was accepted into the ready queue.
    Submitted { priority: i32, seq: u64, timestamp: Instant },
    /// A worker popped a request and began dispatching it.
    DispatchStarted { seq: u64, worker: usize, timestamp: Instant },
    /// A worker finished dispatching a request (successfully or not).
    DispatchFinished { seq: u64, worker: usize, timestamp: Instant },
    /// A worker was cancelled between taking a request and finishing its
    /// dispatch; the request is dropped rather than re-enqueued.
    DispatchCancelled { seq: u64, worker: usize, timestamp: Instant },
    /// Graceful close began.
    CloseStarted { timestamp: Instant },
    /// Close finished, either because all workers drained or the
    /// close timeout expired and remaining workers were cancelled.
    CloseFinished { forced: bool, timestamp: Instant },
}

impl EngineEvent for SchedulerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SchedulerEvent::Submitted { .. } => "submitted",
            SchedulerEvent::DispatchStarted { .. } => "dispatch_started",
            SchedulerEvent::DispatchFinished { .. } => "dispatch_finished",
            SchedulerEvent::DispatchCancelled { .. } => "dispatch_cancelled",
            SchedulerEvent::CloseStarted { .. } => "close_started",
            SchedulerEvent::CloseFinished { .. } => "close_finished",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SchedulerEvent::Submitted { timestamp, .. }
            | SchedulerEvent::DispatchStarted { timestamp, .. }
            | SchedulerEvent::DispatchFinished { timestamp, .. }
            | SchedulerEvent::DispatchCancelled { timestamp, .. }
            | SchedulerEvent::CloseStarted { timestamp }
            | SchedulerEvent::CloseFinished { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "scheduler"
    }
}
