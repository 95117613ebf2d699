//! Lifespan, signal handling, and startup/shutdown orchestration for
//! loomcrawl (specification §4.7 "Executor / Runner").
//!
//! This crate ties together an already-constructed scheduler dispatcher
//! and pipeline [`loomcrawl_pipeline::Dispatcher`] with a user-supplied
//! [`Lifespan`] and runs the exact startup/shutdown sequence the
//! specification describes. It does not parse `argv` or environment
//! variables on its own initiative — see [`cli`] and [`env`] for the
//! documented contract and the overlay helpers a binary or the facade
//! crate applies explicitly.

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod events;
pub mod lifespan;
pub mod runner;
pub mod signal;

pub use config::{ExecutionConfig, ExecutionConfigBuilder, LogLevel};
pub use error::{ConfigError, RunnerError};
pub use events::ExecutorEvent;
pub use lifespan::{Lifespan, LifespanError, NoopLifespan};
pub use runner::{Entry, Runner, RunnerBuilder};
