//! Diagnostic events emitted by the runner.

use loomcrawl_core::EngineEvent;
use std::time::Instant;

/// An event emitted by [`crate::Runner`] for observability.
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    /// Lifespan setup started.
    LifespanSetupStarted { timestamp: Instant },
    /// Lifespan setup finished, with whether it succeeded.
    LifespanSetupFinished { succeeded: bool, timestamp: Instant },
    /// The scheduler's worker pool was started.
    SchedulerStarted { timestamp: Instant },
    /// An entry function was invoked.
    EntryInvoked { name: String, timestamp: Instant },
    /// The drain-wait condition in startup step 4 was satisfied.
    Drained { timestamp: Instant },
    /// `execution.timeout` elapsed before the drain condition was met.
    TimedOut { timestamp: Instant },
    /// A shutdown signal was received.
    SignalReceived { immediate: bool, timestamp: Instant },
    /// Graceful shutdown sequence started.
    ShutdownStarted { timestamp: Instant },
    /// Graceful shutdown sequence finished.
    ShutdownFinished { timestamp: Instant },
}

impl EngineEvent for ExecutorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExecutorEvent::LifespanSetupStarted { .. } => "lifespan_setup_started",
            ExecutorEvent::LifespanSetupFinished { .. } => "lifespan_setup_finished",
            ExecutorEvent::SchedulerStarted { .. } => "scheduler_started",
            ExecutorEvent::EntryInvoked { .. } => "entry_invoked",
            ExecutorEvent::Drained { .. } => "drained",
            ExecutorEvent::TimedOut { .. } => "timed_out",
            ExecutorEvent::SignalReceived { .. } => "signal_received",
            ExecutorEvent::ShutdownStarted { .. } => "shutdown_started",
            ExecutorEvent::ShutdownFinished { .. } => "shutdown_finished",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ExecutorEvent::LifespanSetupStarted { timestamp }
            | ExecutorEvent::LifespanSetupFinished { timestamp, .. }
            | ExecutorEvent::SchedulerStarted { timestamp }
            | ExecutorEvent::EntryInvoked { timestamp, .. }
            | ExecutorEvent::Drained { timestamp }
            | ExecutorEvent::TimedOut { timestamp }
            | ExecutorEvent::SignalReceived { timestamp, .. }
            | ExecutorEvent::ShutdownStarted { timestamp }
            | ExecutorEvent::ShutdownFinished { timestamp } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "executor"
    }
}
