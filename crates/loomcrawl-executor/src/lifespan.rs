//! The lifespan context entered and exited once per run (specification
//! §4.7 "Enter the lifespan context manager", "Exit the lifespan context").
//!
//! Generalized from the teacher's [`Executor`] trait
//! (`tower-resilience-executor`), which offers a single spawn-shaped seam;
//! here the seam is two-phased (`setup`/`teardown`) since a scraper's
//! lifespan typically opens and closes shared resources (an HTTP client
//! pool, a database connection) rather than just running one task.

use async_trait::async_trait;

/// An error raised during lifespan setup. Teardown does not return a
/// `Result`: specification §7 calls teardown failures "logged, not
/// masking" the underlying shutdown, so a teardown error can only be
/// observed through whatever side effect the implementation chooses
/// (e.g. an event, or a log line), never through this trait's return type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("lifespan setup failed: {reason}")]
pub struct LifespanError {
    pub reason: String,
}

impl LifespanError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// The setup/teardown context a [`crate::Runner`] enters once at startup
/// and exits once at shutdown, shielded from cancellation (specification
/// §5 "the lifespan teardown... shielded from cancellation").
#[async_trait]
pub trait Lifespan: Send + Sync {
    /// Runs once before the scheduler starts. An error here aborts startup
    /// entirely; the runner still calls [`Self::teardown`].
    async fn setup(&self) -> Result<(), LifespanError> {
        Ok(())
    }

    /// Runs once after the scheduler and pipeline have both drained or
    /// been cancelled. Always called, even if `setup` failed, and never
    /// cancelled mid-flight.
    async fn teardown(&self) {}
}

/// A [`Lifespan`] with no setup or teardown work, for scrapers that own
/// no external resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifespan;

#[async_trait]
impl Lifespan for NoopLifespan {}
