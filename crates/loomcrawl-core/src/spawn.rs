//! Task-spawning abstraction shared by every crate that owns a background
//! task (the rate limiter's eviction sweep, the scheduler's worker pool,
//! the pipeline dispatcher's shielded close).
//!
//! This is deliberately not the full `Lifespan`/`Runner` machinery — those
//! live in `loomcrawl-executor`, which depends on this crate rather than
//! the other way around. Generalized from the teacher's `Executor` trait
//! (`tower-resilience-executor`), which plays the same role for a single
//! pattern crate.

use std::future::Future;
use tokio::task::JoinHandle;

/// Something that can run a future to completion in the background.
pub trait Spawn: Send + Sync {
    /// Spawns `future`, returning a handle to its result.
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;
}

/// Spawns onto the ambient Tokio runtime via [`tokio::spawn`].
///
/// This is the default used throughout loomcrawl; it requires a Tokio
/// runtime to already be running on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawn;

impl Spawn for TokioSpawn {
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(future)
    }
}

impl Spawn for tokio::runtime::Handle {
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::runtime::Handle::spawn(self, future)
    }
}
