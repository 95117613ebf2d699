//! The Request Manager (specification §4.3): executes one dispatch
//! through the middleware chain, the rate limiter, and the HTTP adapter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use loomcrawl_core::{ClientError, ControlFlow, EngineEvent};
use loomcrawl_ratelimiter::{Outcome as LimiterOutcome, RateLimiter};

use crate::adapter::HttpAdapter;
use crate::depend::{Handler, ParamMap, Resolver};
use crate::model::{Request, Response};

/// A failed dispatch outcome, passed to request-exception middlewares
/// and to the errback.
#[derive(Debug, Clone)]
pub enum Failure {
    /// The HTTP adapter could not complete the exchange at all.
    Transport(loomcrawl_core::TransportError),
    /// A response was obtained but its status was >= 400.
    Http(Response),
}

impl Failure {
    /// The status code that triggered this failure, if one was obtained.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Failure::Transport(_) => None,
            Failure::Http(response) => Some(response.status),
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Failure::Transport(_) => None,
            Failure::Http(response) => response.retry_after(),
        }
    }
}

/// Something that can submit further requests on behalf of a running
/// callback/errback/entry function — the `send_request` capability the
/// Dependency Resolver injects (specification §4.3, §4.6).
#[async_trait::async_trait]
pub trait SendRequest: Send + Sync {
    /// Submits `request` through the outer-request middleware chain and
    /// into the scheduler. Mirrors `Scheduler::submit`'s contract.
    async fn send(&self, request: Request) -> Result<(), loomcrawl_scheduler::SchedulerError>;

    /// Re-submits `request` bypassing outer-request middlewares,
    /// preserving request identity — used by the retry subsystem only.
    async fn resubmit(&self, request: Request) -> Result<(), loomcrawl_scheduler::SchedulerError>;
}

/// Diagnostic events emitted by the Request Manager.
#[derive(Debug, Clone)]
pub enum RequestManagerEvent {
    Dispatched { id: u64, status: Option<u16>, latency: Duration, timestamp: Instant },
    Failed { id: u64, reason: &'static str, timestamp: Instant },
    Stopped { id: u64, phase: &'static str, timestamp: Instant },
}

impl EngineEvent for RequestManagerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RequestManagerEvent::Dispatched { .. } => "dispatched",
            RequestManagerEvent::Failed { .. } => "failed",
            RequestManagerEvent::Stopped { .. } => "stopped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RequestManagerEvent::Dispatched { timestamp, .. }
            | RequestManagerEvent::Failed { timestamp, .. }
            | RequestManagerEvent::Stopped { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "request_manager"
    }
}

/// Executes one `Request` dispatch end to end: inner-request middlewares,
/// rate-limit acquire, HTTP adapter invocation, outcome reporting, and
/// response/exception middlewares followed by the callback or errback.
pub struct RequestManager<A: HttpAdapter> {
    adapter: Arc<A>,
    limiter: Arc<RateLimiter<Request>>,
    inner_request: crate::middleware::MiddlewareChain,
    response: crate::middleware::MiddlewareChain,
    request_exception: crate::middleware::MiddlewareChain,
    resolver: Arc<Resolver>,
    listeners: loomcrawl_core::EventListeners<RequestManagerEvent>,
}

/// A minimal failure-trigger classifier: which statuses and transport
/// error kinds count as a rate-limiter/retry "failure trigger".
pub struct TriggerConfig {
    pub failure_statuses: Vec<u16>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self { failure_statuses: vec![429, 500, 502, 503, 504] }
    }
}

impl TriggerConfig {
    pub fn triggers_on_status(&self, status: http::StatusCode) -> bool {
        self.failure_statuses.contains(&status.as_u16())
    }

    fn respects_retry_after(&self, status: http::StatusCode) -> bool {
        matches!(status.as_u16(), 429 | 503)
    }
}

impl<A: HttpAdapter> RequestManager<A> {
    pub fn new(
        adapter: Arc<A>,
        limiter: Arc<RateLimiter<Request>>,
        inner_request: crate::middleware::MiddlewareChain,
        response: crate::middleware::MiddlewareChain,
        request_exception: crate::middleware::MiddlewareChain,
        resolver: Arc<Resolver>,
    ) -> Self {
        Self {
            adapter,
            limiter,
            inner_request,
            response,
            request_exception,
            resolver,
            listeners: loomcrawl_core::EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: loomcrawl_core::EventListener<RequestManagerEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Executes the full dispatch sequence for `request` (specification
    /// §4.3 steps 1-7). `callback`/`errback` are resolved by the caller
    /// (the scraper registry) from the `Request`'s `HandlerId`s; passing
    /// `None` skips that step, matching "if the Request has a callback".
    pub async fn execute(
        &self,
        request: Request,
        triggers: &TriggerConfig,
        callback: Option<&dyn Handler>,
        errback: Option<&dyn Handler>,
        engine_provided: ParamMap,
    ) {
        let id = request.meta.id.0;

        // Step 1: inner-request middlewares.
        let request = match self.inner_request.run_request(request).await {
            ControlFlow::Continue(request) => request,
            ControlFlow::StopPhase(request) => request,
            ControlFlow::StopRequest => {
                self.listeners.emit(&RequestManagerEvent::Stopped {
                    id,
                    phase: "inner_request",
                    timestamp: Instant::now(),
                });
                return;
            }
        };

        // Step 2: rate-limit acquire.
        self.limiter.acquire(&request).await;

        // Step 3: dispatch, recording wall-clock latency.
        let started = Instant::now();
        let dispatch_result = self.adapter.dispatch(&request).await;
        let latency = started.elapsed();

        let request = Arc::new(request);

        // Step 4: report outcome to the rate limiter. Per specification
        // §4.2, this is a three-way classification: a Retry-After
        // override, else a *configured* failure trigger, else success —
        // a non-2xx status that isn't in `triggers`' configured set
        // (e.g. a plain 404) paces the group like any other success.
        let outcome = match &dispatch_result {
            Ok(raw) if triggers.respects_retry_after(raw.status) => match retry_after_from_headers(&raw.headers) {
                Some(retry_after) => LimiterOutcome::RetryAfter(retry_after),
                None if triggers.triggers_on_status(raw.status) => LimiterOutcome::Failure,
                None => LimiterOutcome::Success { latency },
            },
            Ok(raw) if triggers.triggers_on_status(raw.status) => LimiterOutcome::Failure,
            Ok(_) => LimiterOutcome::Success { latency },
            Err(_) => LimiterOutcome::Failure,
        };
        self.limiter.record_outcome(&request, outcome).await;

        self.listeners.emit(&RequestManagerEvent::Dispatched {
            id,
            status: dispatch_result.as_ref().ok().map(|raw| raw.status.as_u16()),
            latency,
            timestamp: Instant::now(),
        });

        match dispatch_result {
            Err(transport_err) => {
                self.handle_failure(Failure::Transport(transport_err), request, errback).await;
            }
            Ok(raw) if raw.status.as_u16() >= 400 => {
                let response =
                    Response::new(Arc::clone(&request), raw.final_url, raw.status, raw.headers, raw.body);
                self.handle_failure(Failure::Http(response), request, errback).await;
            }
            Ok(raw) => {
                let response =
                    Response::new(Arc::clone(&request), raw.final_url, raw.status, raw.headers, raw.body);

                // Step 6: response middlewares.
                let response = match self.response.run_response(response).await {
                    ControlFlow::Continue(response) => response,
                    ControlFlow::StopPhase(response) => response,
                    ControlFlow::StopRequest => {
                        self.listeners.emit(&RequestManagerEvent::Stopped {
                            id,
                            phase: "response",
                            timestamp: Instant::now(),
                        });
                        return;
                    }
                };

                // Step 7: callback, through the Dependency Resolver.
                if let Some(callback) = callback {
                    let mut params = engine_provided;
                    params.insert("response", response);
                    if let Err(err) = self.resolver.invoke(callback, params, &request.extra).await {
                        self.listeners.emit(&RequestManagerEvent::Failed {
                            id,
                            reason: "callback_dependency_missing",
                            timestamp: Instant::now(),
                        });
                        tracing_warn(&err);
                    }
                }
            }
        }
    }

    async fn handle_failure(&self, failure: Failure, request: Arc<Request>, errback: Option<&dyn Handler>) {
        let id = request.meta.id.0;

        // Step 5: request-exception middlewares.
        let failure = match self.request_exception.run_exception(Arc::clone(&request), failure).await {
            ControlFlow::Continue(failure) => failure,
            ControlFlow::StopPhase(failure) => failure,
            ControlFlow::StopRequest => {
                self.listeners.emit(&RequestManagerEvent::Stopped {
                    id,
                    phase: "request_exception",
                    timestamp: Instant::now(),
                });
                return;
            }
        };

        self.listeners.emit(&RequestManagerEvent::Failed { id, reason: "terminal", timestamp: Instant::now() });

        if let Some(errback) = errback {
            let mut params = ParamMap::new();
            params.insert("failure", failure);
            if let Err(err) = self.resolver.invoke(errback, params, &request.extra).await {
                tracing_warn(&err);
            }
        }
    }
}

fn retry_after_from_headers(headers: &http::HeaderMap) -> Option<Duration> {
    headers
        .get(http::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn tracing_warn(_err: &ClientError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(error = %_err, "handler invocation failed");
}
