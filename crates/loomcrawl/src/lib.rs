//! # loomcrawl
//!
//! A concurrent, priority-scheduled web scraping engine: a bounded
//! priority queue and worker pool, an adaptive per-host rate limiter, a
//! request-lifecycle middleware chain with pluggable retry, a type-keyed
//! item pipeline, and the startup/shutdown orchestration that ties them
//! together.
//!
//! This crate is the facade: it re-exports every subsystem crate behind
//! feature flags (mirroring how `tower-resilience` composes its pattern
//! crates) and provides [`Scraper`], the single type most applications
//! build against.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use loomcrawl::{ClientError, Handler, HandlerId, ParamMap, Request, RequestId, Scraper, SendRequest};
//! use url::Url;
//!
//! struct Start;
//!
//! #[async_trait]
//! impl Handler for Start {
//!     fn name(&self) -> &str {
//!         "start"
//!     }
//!
//!     fn required_params(&self) -> &'static [&'static str] {
//!         &["send_request"]
//!     }
//!
//!     async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
//!         let send_request: &Arc<dyn SendRequest> = params.get("send_request").expect("engine-provided");
//!         let request = Request::get(Url::parse("https://example.com").unwrap(), RequestId(1))
//!             .with_callback(HandlerId::new("print_title"));
//!         let _ = send_request.send(request).await;
//!         Ok(())
//!     }
//! }
//!
//! struct PrintTitle;
//!
//! #[async_trait]
//! impl Handler for PrintTitle {
//!     fn name(&self) -> &str {
//!         "print_title"
//!     }
//!
//!     fn required_params(&self) -> &'static [&'static str] {
//!         &["response"]
//!     }
//!
//!     async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
//!         let response: &loomcrawl::Response = params.get("response").expect("checked by resolver");
//!         println!("fetched {} ({})", response.final_url, response.status);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let scraper = Scraper::builder()
//!         .register_handler("print_title", PrintTitle)
//!         .register_scraper("start", Arc::new(Start))
//!         .build();
//!
//!     scraper.run().await.expect("scraper run failed");
//! }
//! ```
//!
//! ## When to Use
//!
//! Reach for `loomcrawl` whenever a crawl needs more than a handful of
//! sequential requests: a priority queue that lets time-sensitive
//! requests jump the line, per-host pacing that reacts to the target's
//! own latency and error rate instead of a single global rate, and a
//! retry/pipeline stack that composes instead of being hand-rolled per
//! scraper.
//!
//! ## Trade-offs
//!
//! The engine is optimized for many concurrent hosts at moderate
//! per-host concurrency, not for saturating a single endpoint as fast as
//! possible — the adaptive rate limiter actively backs off a host that
//! starts failing, which is the point, but it means a deliberately
//! aggressive single-target benchmark will see throughput capped well
//! below what bypassing the limiter could achieve.
//!
//! ## Feature Flags
//!
//! - `retry` (default): the retry middleware and backoff strategies
//!   (`ConstantInterval`/`LinearInterval`/`ExponentialInterval`/
//!   `ExponentialJitterInterval`).
//! - `reqwest` (default): [`ReqwestAdapter`], the bundled HTTP adapter.
//!   Disable it and supply a custom [`HttpAdapter`] to drop the
//!   reqwest/rustls dependency tree entirely.
//! - `tracing` / `metrics`: cascades into every subsystem crate.
//!
//! ## Anti-Patterns
//!
//! Don't register a callback as a blocking, CPU-bound closure — every
//! callback runs on the shared Tokio worker pool backing the scheduler's
//! concurrent dispatches; a long synchronous computation starves
//! unrelated in-flight requests. Offload it with
//! `tokio::task::spawn_blocking` instead.

pub mod env;
pub mod scraper;
pub mod session;

pub use loomcrawl_core::{
    CancellationToken, ClientError, ControlFlow, EngineError, EventListener, EventListeners, HttpError,
    PipelineFlow, ShutdownLevel, Spawn, TokioSpawn, TransportError,
};
pub use loomcrawl_executor::{
    ExecutionConfig, ExecutionConfigBuilder, Lifespan, LifespanError, LogLevel, NoopLifespan, RunnerError,
};
pub use loomcrawl_pipeline::{
    Dispatcher as PipelineDispatcher, GlobalMiddleware, ItemMiddleware, Pipeline, PipelineConfig,
    PipelineConfigBuilder, PipelineEvent,
};
pub use loomcrawl_ratelimiter::{
    AdaptiveConfig, GroupKey, RateLimiter, RateLimiterConfig, RateLimiterConfigBuilder, RateLimiterEvent,
};
pub use loomcrawl_request::{
    Body, Extra, Failure, Handler, HandlerId, HttpAdapter, MiddlewareChain, Part, ParamMap, Phase, QueryValue,
    Request, RequestId, RequestManagerEvent, RequestMiddleware, Resolver, Response, SendRequest,
};
#[cfg(feature = "reqwest")]
pub use loomcrawl_request::ReqwestAdapter;
pub use loomcrawl_scheduler::{Scheduler, SchedulerConfig, SchedulerConfigBuilder, SchedulerError, SchedulerEvent};

#[cfg(feature = "retry")]
pub use loomcrawl_retry::{BackoffKind, RetryConfig, RetryConfigBuilder, RetryEvent, RetryMiddleware};

pub use scraper::{Entry, Scraper, ScraperBuilder, ScraperError};
pub use session::SessionConfig;
