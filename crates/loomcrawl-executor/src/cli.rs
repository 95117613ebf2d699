//! Command-line surface, documented for compatibility only (specification
//! §6 "CLI surface... the core does not own parsing").
//!
//! This module intentionally contains no parsing or argument-handling
//! code. A binary built on top of this crate owns `argv` and environment
//! discovery; what follows is the contract such a binary should honor so
//! that tooling and scripts built against one loomcrawl-based CLI work
//! against another.
//!
//! # Invocation
//!
//! A command receives a target module descriptor and optional flags:
//!
//! - `--concurrent-requests <N>` — overrides `scheduler.concurrent_requests`.
//! - `--pending-requests <N>` — overrides `scheduler.pending_requests`.
//!
//! # Entry resolution
//!
//! - If no attribute is named on the module descriptor, the binary looks
//!   up a well-known attribute that is either a scraper instance or a
//!   factory producing one.
//! - If an attribute is named, the binary uses it directly, awaiting it
//!   first if it is itself async (e.g. an async factory function).
//!
//! # Exit codes
//!
//! - `0` — the run completed and shut down cleanly.
//! - `1` — a startup or teardown error occurred ([`crate::error::RunnerError`]
//!   or a [`crate::lifespan::LifespanError`]).
//! - `130` — the process exited because of a delivered signal
//!   (conventionally `128 + SIGINT`), matching the POSIX shell convention
//!   so pipelines composing this binary with other tools see a familiar
//!   code.
