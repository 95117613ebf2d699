//! Shutdown signalling shared by the scheduler, request manager, and
//! executor.
//!
//! Shutdown has two levels, matching the specification's lifespan contract:
//! a *graceful* request (stop accepting new work, let in-flight work drain)
//! and an *immediate* one (stop everything now). Both are modeled as a
//! single `AtomicU8` so any task can poll the current level without taking
//! a lock, the same way the teacher's circuit breaker tracks its state in
//! an `AtomicU8` rather than behind a mutex.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

const RUNNING: u8 = 0;
const GRACEFUL: u8 = 1;
const IMMEDIATE: u8 = 2;

/// The current shutdown level of a running engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownLevel {
    /// Normal operation, accepting new work.
    Running,
    /// No new work is accepted; in-flight work is allowed to finish.
    Graceful,
    /// All work should stop as soon as possible.
    Immediate,
}

impl From<u8> for ShutdownLevel {
    fn from(value: u8) -> Self {
        match value {
            RUNNING => ShutdownLevel::Running,
            GRACEFUL => ShutdownLevel::Graceful,
            _ => ShutdownLevel::Immediate,
        }
    }
}

/// A cheaply-cloneable, shared shutdown flag.
///
/// Raising the level is monotonic: once `graceful` or `immediate` is
/// signalled it can never drop back to `Running`, and `immediate`
/// always wins over `graceful`.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    level: Arc<AtomicU8>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Creates a new token in the `Running` state.
    pub fn new() -> Self {
        Self {
            level: Arc::new(AtomicU8::new(RUNNING)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Returns the current shutdown level.
    pub fn level(&self) -> ShutdownLevel {
        self.level.load(Ordering::SeqCst).into()
    }

    /// Returns `true` once any shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.level.load(Ordering::SeqCst) != RUNNING
    }

    /// Returns `true` once immediate shutdown has been requested.
    pub fn is_immediate(&self) -> bool {
        self.level.load(Ordering::SeqCst) == IMMEDIATE
    }

    /// Requests graceful shutdown. A no-op if shutdown was already
    /// requested at any level.
    pub fn cancel_graceful(&self) {
        let _ = self
            .level
            .compare_exchange(RUNNING, GRACEFUL, Ordering::SeqCst, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Requests immediate shutdown. Always wins regardless of current level.
    pub fn cancel_immediate(&self) {
        self.level.store(IMMEDIATE, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Waits until the level changes from `Running` to anything else.
    ///
    /// Cancellation-safe: this can be raced against other branches of a
    /// `tokio::select!` without losing a notification, because the
    /// condition is re-checked after each wake.
    pub async fn cancelled(&self) {
        loop {
            if self.is_shutting_down() {
                return;
            }
            let notified = self.notify.notified();
            if self.is_shutting_down() {
                return;
            }
            notified.await;
        }
    }

    /// Waits until immediate shutdown specifically has been requested
    /// (unlike [`Self::cancelled`], a graceful-only request does not
    /// resolve this).
    pub async fn cancelled_immediately(&self) {
        loop {
            if self.is_immediate() {
                return;
            }
            let notified = self.notify.notified();
            if self.is_immediate() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
