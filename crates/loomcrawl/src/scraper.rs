//! [`Scraper`]: the registry of entry functions, middlewares, pipelines,
//! and scraper-level dependencies described in the specification's
//! component table, generalized here into an explicit builder API
//! (mirroring `tower-resilience`'s top-level facade crate).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use loomcrawl_core::{CancellationToken, ControlFlow, EventListener};
use loomcrawl_executor::{ExecutionConfig, ExecutorEvent, Lifespan, NoopLifespan, RunnerBuilder, RunnerError};
use loomcrawl_pipeline::{
    Dispatcher as PipelineDispatcher, GlobalMiddleware, ItemMiddleware, Pipeline, PipelineConfig, PipelineEvent,
};
use loomcrawl_ratelimiter::{RateLimiter, RateLimiterConfig, RateLimiterEvent};
use loomcrawl_request::{
    Extra, Handler, HandlerId, HttpAdapter, MiddlewareChain, ParamMap, Phase, Request, RequestManager,
    RequestManagerEvent, RequestMiddleware, Resolver, SendRequest, TriggerConfig,
};
use loomcrawl_scheduler::{Dispatch as SchedulerDispatch, Scheduler, SchedulerConfig, SchedulerError, SchedulerEvent};

#[cfg(feature = "retry")]
use loomcrawl_retry::{RetryConfig, RetryEvent, RetryMiddleware};

/// Errors raised while running a [`Scraper`].
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// An entry function: invoked once at startup with the `send_request`
/// and `pipeline` capabilities engine-provided through the Dependency
/// Resolver, so it can submit the scraper's initial requests
/// (specification §4.7 startup step 3). Entries are ordinary [`Handler`]s,
/// resolved the same way callbacks and errbacks are.
pub type Entry = Arc<dyn Handler>;

/// Routes one dispatch's callback/errback through the Dependency
/// Resolver, wiring in the `send_request` and `pipeline` capabilities
/// every handler call receives.
struct ScraperDispatch<A: HttpAdapter> {
    manager: Arc<RequestManager<A>>,
    triggers: TriggerConfig,
    handlers: Arc<HashMap<HandlerId, Arc<dyn Handler>>>,
    sender: Arc<ScraperSender>,
    pipeline: Arc<PipelineDispatcher>,
}

impl<A: HttpAdapter> ScraperDispatch<A> {
    fn engine_provided(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("send_request", Arc::clone(&self.sender) as Arc<dyn SendRequest>);
        params.insert("pipeline", Arc::clone(&self.pipeline));
        params
    }
}

impl<A: HttpAdapter + 'static> SchedulerDispatch<Request> for ScraperDispatch<A> {
    async fn dispatch(&self, request: Request) {
        let callback: Option<&dyn Handler> =
            request.callback.and_then(|id| self.handlers.get(&id)).map(|handler| handler.as_ref());
        let errback: Option<&dyn Handler> =
            request.errback.and_then(|id| self.handlers.get(&id)).map(|handler| handler.as_ref());
        self.manager.execute(request, &self.triggers, callback, errback, self.engine_provided()).await;
    }
}

/// The `send_request` capability injected into every handler call: submits
/// fresh requests through the outer-request middleware chain, or
/// re-submits a retry attempt bypassing it, per specification §4.3.
struct ScraperSender {
    scheduler: OnceLock<Arc<Scheduler<Request>>>,
    outer_request: MiddlewareChain,
}

impl ScraperSender {
    fn scheduler(&self) -> &Arc<Scheduler<Request>> {
        self.scheduler.get().expect("scheduler is set before the runner invokes any entry or dispatch")
    }
}

#[async_trait::async_trait]
impl SendRequest for ScraperSender {
    async fn send(&self, request: Request) -> Result<(), SchedulerError> {
        let request = match self.outer_request.run_request(request).await {
            ControlFlow::Continue(request) | ControlFlow::StopPhase(request) => request,
            ControlFlow::StopRequest => return Ok(()),
        };
        let priority = request.priority;
        self.scheduler().submit(priority, request).await
    }

    async fn resubmit(&self, request: Request) -> Result<(), SchedulerError> {
        let priority = request.priority;
        self.scheduler().submit(priority, request).await
    }
}

/// Builds a [`Scraper`]: registers entry functions, handlers, middlewares,
/// pipelines, and scraper-level dependencies, then assembles the
/// scheduler, rate limiter, request manager, and pipeline dispatcher that
/// back it.
pub struct ScraperBuilder<A: HttpAdapter> {
    adapter: Arc<A>,
    scheduler_config: SchedulerConfig,
    execution_config: ExecutionConfig,
    rate_limiter_config: RateLimiterConfig,
    pipeline_config: PipelineConfig,
    #[cfg(feature = "retry")]
    retry_config: Option<RetryConfig>,
    triggers: TriggerConfig,
    lifespan: Arc<dyn Lifespan>,
    outer_request: MiddlewareChain,
    inner_request: MiddlewareChain,
    response: MiddlewareChain,
    request_exception: MiddlewareChain,
    resolver: Resolver,
    handlers: HashMap<HandlerId, Arc<dyn Handler>>,
    entries: Vec<(String, Entry)>,
    pipeline_dispatcher: PipelineDispatcher,
    rate_limiter_listeners: Vec<Box<dyn FnOnce(&mut RateLimiter<Request>) + Send>>,
    request_manager_listeners: Vec<Box<dyn FnOnce(&mut RequestManager<A>) + Send>>,
    #[cfg(feature = "retry")]
    retry_listeners: Vec<Box<dyn FnOnce(&mut RetryMiddleware) + Send>>,
    executor_listeners: Vec<Box<dyn FnOnce(RunnerBuilder<Request, ScraperDispatch<A>>) -> RunnerBuilder<Request, ScraperDispatch<A>>>>,
    scheduler_listeners: Vec<Box<dyn FnOnce(RunnerBuilder<Request, ScraperDispatch<A>>) -> RunnerBuilder<Request, ScraperDispatch<A>>>>,
    cancel: CancellationToken,
    install_signal_handlers: bool,
}

impl<A: HttpAdapter + 'static> ScraperBuilder<A> {
    /// Starts a builder around a concrete [`HttpAdapter`]. Use
    /// [`Scraper::builder`] for the bundled `reqwest` adapter instead.
    pub fn with_adapter(adapter: A) -> Self {
        Self {
            adapter: Arc::new(adapter),
            scheduler_config: SchedulerConfig::default(),
            execution_config: ExecutionConfig::default(),
            rate_limiter_config: RateLimiterConfig::default(),
            pipeline_config: PipelineConfig::default(),
            #[cfg(feature = "retry")]
            retry_config: Some(RetryConfig::builder().build()),
            triggers: TriggerConfig::default(),
            lifespan: Arc::new(NoopLifespan),
            outer_request: MiddlewareChain::new(),
            inner_request: MiddlewareChain::new(),
            response: MiddlewareChain::new(),
            request_exception: MiddlewareChain::new(),
            resolver: Resolver::new(),
            handlers: HashMap::new(),
            entries: Vec::new(),
            pipeline_dispatcher: PipelineDispatcher::new(PipelineConfig::default()),
            rate_limiter_listeners: Vec::new(),
            request_manager_listeners: Vec::new(),
            #[cfg(feature = "retry")]
            retry_listeners: Vec::new(),
            executor_listeners: Vec::new(),
            scheduler_listeners: Vec::new(),
            cancel: CancellationToken::new(),
            install_signal_handlers: true,
        }
    }

    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = config;
        self
    }

    pub fn execution_config(mut self, config: ExecutionConfig) -> Self {
        self.execution_config = config;
        self
    }

    pub fn rate_limiter_config(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limiter_config = config;
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = config;
        self.pipeline_dispatcher = PipelineDispatcher::new(config);
        self
    }

    /// Sets the retry policy. Pass `None` to disable retries entirely
    /// (non-2xx responses and transport errors still reach the errback,
    /// they simply never re-submit).
    #[cfg(feature = "retry")]
    pub fn retry_config(mut self, config: Option<RetryConfig>) -> Self {
        self.retry_config = config;
        self
    }

    /// Overrides which statuses/transport failures count as a
    /// rate-limiter/retry failure trigger.
    pub fn triggers(mut self, triggers: TriggerConfig) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn lifespan(mut self, lifespan: impl Lifespan + 'static) -> Self {
        self.lifespan = Arc::new(lifespan);
        self
    }

    /// Uses `cancel` as the scraper's shutdown token, so an external
    /// caller can trigger shutdown without going through
    /// [`loomcrawl_executor::signal::install`].
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Controls whether [`Scraper::run`] installs its own SIGINT/SIGTERM
    /// handler (on by default, specification §5). Disable this when the
    /// host process already owns signal handling, e.g. to run several
    /// scrapers in one process or under a test harness.
    pub fn install_signal_handlers(mut self, install: bool) -> Self {
        self.install_signal_handlers = install;
        self
    }

    /// Registers a request-lifecycle middleware for `phase`.
    pub fn register_middleware(mut self, phase: Phase, middleware: Arc<dyn RequestMiddleware>) -> Self {
        match phase {
            Phase::OuterRequest => self.outer_request.register(middleware),
            Phase::InnerRequest => self.inner_request.register(middleware),
            Phase::Response => self.response.register(middleware),
            Phase::RequestException => self.request_exception.register(middleware),
        }
        self
    }

    /// Registers a callback/errback/entry handler under `name`, giving it
    /// a stable [`HandlerId`] requests and entry registration can address.
    pub fn register_handler(mut self, name: &'static str, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(HandlerId::new(name), Arc::new(handler));
        self
    }

    /// Registers a scraper-level dependency, resolved for any handler
    /// that names it, below engine-provided values and request extras in
    /// precedence.
    pub fn register_dependency<T: std::any::Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.resolver.register_dependency(name, value);
        self
    }

    /// Registers `handler` as an entry function, invoked once at startup
    /// with `send_request`/`pipeline` engine-provided and any matching
    /// scraper-level dependency resolved the same way a callback's is.
    pub fn register_scraper(mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.entries.push((name.into(), handler));
        self
    }

    /// Registers a pipeline for item type `T`, in call order.
    pub fn register_pipeline<T, P>(mut self, pipeline: P) -> Self
    where
        T: Send + 'static,
        P: Pipeline<T> + 'static,
    {
        self.pipeline_dispatcher.register_pipeline::<T, P>(pipeline);
        self
    }

    /// Registers a pre-middleware for item type `T`.
    pub fn register_pre_middleware<T, M>(mut self, middleware: M) -> Self
    where
        T: Send + 'static,
        M: ItemMiddleware<T> + 'static,
    {
        self.pipeline_dispatcher.register_pre_middleware::<T, M>(middleware);
        self
    }

    /// Registers a post-middleware for item type `T`.
    pub fn register_post_middleware<T, M>(mut self, middleware: M) -> Self
    where
        T: Send + 'static,
        M: ItemMiddleware<T> + 'static,
    {
        self.pipeline_dispatcher.register_post_middleware::<T, M>(middleware);
        self
    }

    /// Registers a global middleware, applied to every item type.
    pub fn register_global_middleware<M>(mut self, middleware: M) -> Self
    where
        M: GlobalMiddleware + 'static,
    {
        self.pipeline_dispatcher.register_global_middleware(middleware);
        self
    }

    pub fn executor_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<ExecutorEvent> + 'static,
    {
        self.executor_listeners.push(Box::new(move |builder| builder.executor_listener(listener)));
        self
    }

    pub fn scheduler_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<SchedulerEvent> + 'static,
    {
        self.scheduler_listeners.push(Box::new(move |builder| builder.scheduler_listener(listener)));
        self
    }

    pub fn rate_limiter_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RateLimiterEvent> + 'static,
    {
        self.rate_limiter_listeners.push(Box::new(move |limiter| limiter.add_listener(listener)));
        self
    }

    pub fn request_manager_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RequestManagerEvent> + 'static,
    {
        self.request_manager_listeners.push(Box::new(move |manager| manager.add_listener(listener)));
        self
    }

    pub fn pipeline_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<PipelineEvent> + 'static,
    {
        self.pipeline_dispatcher.add_listener(listener);
        self
    }

    #[cfg(feature = "retry")]
    pub fn retry_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RetryEvent> + 'static,
    {
        self.retry_listeners.push(Box::new(move |middleware| middleware.add_listener(listener)));
        self
    }

    /// Applies the environment-variable overlay (`LOOMCRAWL_*`) to every
    /// configuration block this builder owns, failing on the first
    /// malformed value (specification §6).
    pub fn apply_env_overlay(mut self) -> Result<Self, loomcrawl_executor::ConfigError> {
        loomcrawl_executor::env::overlay_scheduler(&mut self.scheduler_config)?;
        loomcrawl_executor::env::overlay_execution(&mut self.execution_config)?;
        loomcrawl_executor::env::overlay_pipeline(&mut self.pipeline_config)?;
        crate::env::overlay_rate_limiter(&mut self.rate_limiter_config)?;
        #[cfg(feature = "retry")]
        {
            self.retry_config = Some(crate::env::overlay_retry(RetryConfig::builder())?.build());
        }
        self.pipeline_dispatcher = PipelineDispatcher::new(self.pipeline_config);
        Ok(self)
    }

    /// Assembles the rate limiter, request manager, scheduler dispatcher,
    /// and runner, producing a [`Scraper`] ready to [`Scraper::run`].
    pub fn build(self) -> Scraper<A> {
        // Read before `self.rate_limiter_config` moves into the limiter:
        // whether adaptive rate limiting should inherit its failure-
        // trigger status set from the retry policy rather than keeping
        // the separately-configured `triggers` set (specification §6
        // `adaptive.inherit_retry_triggers`).
        #[cfg(feature = "retry")]
        let inherit_retry_triggers =
            self.rate_limiter_config.adaptive.as_ref().is_some_and(|adaptive| adaptive.inherit_retry_triggers);

        let mut rate_limiter = RateLimiter::new(self.rate_limiter_config);
        for apply in self.rate_limiter_listeners {
            apply(&mut rate_limiter);
        }
        let rate_limiter = Arc::new(rate_limiter);

        let sender = Arc::new(ScraperSender { scheduler: OnceLock::new(), outer_request: self.outer_request });

        let mut request_exception = self.request_exception;
        let mut triggers = self.triggers;
        #[cfg(feature = "retry")]
        if let Some(retry_config) = self.retry_config {
            if inherit_retry_triggers {
                triggers.failure_statuses = retry_config.failure_statuses().to_vec();
            }
            let mut retry_middleware = RetryMiddleware::new(retry_config, Arc::clone(&sender) as Arc<dyn SendRequest>)
                .with_cancellation(self.cancel.clone());
            for apply in self.retry_listeners {
                apply(&mut retry_middleware);
            }
            request_exception.register(Arc::new(retry_middleware));
        }

        let resolver = Arc::new(self.resolver);

        let mut request_manager = RequestManager::new(
            Arc::clone(&self.adapter),
            Arc::clone(&rate_limiter),
            self.inner_request,
            self.response,
            request_exception,
            Arc::clone(&resolver),
        );
        for apply in self.request_manager_listeners {
            apply(&mut request_manager);
        }
        let request_manager = Arc::new(request_manager);

        let pipeline_dispatcher = Arc::new(self.pipeline_dispatcher);
        let handlers = Arc::new(self.handlers);

        let dispatch = ScraperDispatch {
            manager: request_manager,
            triggers,
            handlers: Arc::clone(&handlers),
            sender: Arc::clone(&sender),
            pipeline: Arc::clone(&pipeline_dispatcher),
        };

        let eviction_handle = rate_limiter.spawn_eviction_sweep(&loomcrawl_core::TokioSpawn);

        let mut runner_builder =
            RunnerBuilder::<Request, _>::new(self.lifespan, dispatch, Arc::clone(&pipeline_dispatcher))
                .scheduler_config(self.scheduler_config)
                .execution_config(self.execution_config)
                .cancellation_token(self.cancel)
                .install_signal_handlers(self.install_signal_handlers);

        for apply in self.executor_listeners {
            runner_builder = apply(runner_builder);
        }
        for apply in self.scheduler_listeners {
            runner_builder = apply(runner_builder);
        }

        for (name, handler) in self.entries {
            let sender = Arc::clone(&sender);
            let pipeline = Arc::clone(&pipeline_dispatcher);
            let resolver = Arc::clone(&resolver);
            runner_builder = runner_builder.entry(
                name,
                Box::new(move |scheduler: Arc<Scheduler<Request>>| {
                    let _ = sender.scheduler.set(Arc::clone(&scheduler));
                    let sender = Arc::clone(&sender);
                    let pipeline = Arc::clone(&pipeline);
                    let resolver = Arc::clone(&resolver);
                    let handler = Arc::clone(&handler);
                    Box::pin(async move {
                        let mut engine_provided = ParamMap::new();
                        engine_provided.insert("send_request", Arc::clone(&sender) as Arc<dyn SendRequest>);
                        engine_provided.insert("pipeline", pipeline);
                        if let Err(err) = resolver.invoke(handler.as_ref(), engine_provided, &Extra::new()).await {
                            tracing_unavailable_warn(&err);
                        }
                    })
                }),
            );
        }

        Scraper { runner: runner_builder.build(), _eviction_handle: eviction_handle }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn tracing_unavailable_warn(err: &loomcrawl_core::ClientError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(error = %err, "entry function dependency resolution failed");
}

/// The assembled, ready-to-run scraper: owns the scheduler dispatcher,
/// request manager, pipeline dispatcher, and runner built by
/// [`ScraperBuilder`].
pub struct Scraper<A: HttpAdapter> {
    runner: loomcrawl_executor::Runner<Request, ScraperDispatch<A>>,
    _eviction_handle: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "reqwest")]
impl Scraper<loomcrawl_request::ReqwestAdapter> {
    /// Starts a builder using the bundled `reqwest`-backed adapter, built
    /// from the default [`crate::SessionConfig`].
    pub fn builder() -> ScraperBuilder<loomcrawl_request::ReqwestAdapter> {
        Self::builder_with_session(crate::SessionConfig::default())
    }

    /// Starts a builder using the bundled `reqwest`-backed adapter, built
    /// from a caller-supplied [`crate::SessionConfig`].
    pub fn builder_with_session(session: crate::SessionConfig) -> ScraperBuilder<loomcrawl_request::ReqwestAdapter> {
        let client = session.build_client().expect("session configuration produces a valid reqwest client");
        ScraperBuilder::with_adapter(loomcrawl_request::ReqwestAdapter::new(
            client,
            session.timeout,
            session.user_agent.clone(),
        ))
    }
}

impl<A: HttpAdapter + 'static> Scraper<A> {
    /// Starts a builder around a custom [`HttpAdapter`].
    pub fn builder_with_adapter(adapter: A) -> ScraperBuilder<A> {
        ScraperBuilder::with_adapter(adapter)
    }

    /// The shared cancellation token driving this scraper's shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.runner.cancellation_token()
    }

    /// Runs the full startup and shutdown sequence to completion
    /// (specification §4.7). Consumes the scraper: a [`Scraper`] runs
    /// exactly once.
    pub async fn run(self) -> Result<(), ScraperError> {
        self.runner.run().await.map_err(ScraperError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use loomcrawl_core::ClientError;
    use loomcrawl_request::RequestId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    struct StubAdapter;

    #[async_trait]
    impl HttpAdapter for StubAdapter {
        async fn dispatch(
            &self,
            _request: &Request,
        ) -> Result<loomcrawl_request::RawResponse, loomcrawl_core::TransportError> {
            Ok(loomcrawl_request::RawResponse {
                final_url: Url::parse("https://example.com/").unwrap(),
                status: http::StatusCode::OK,
                headers: http::HeaderMap::new(),
                body: Bytes::from_static(b"ok"),
            })
        }
    }

    struct Seed {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for Seed {
        fn name(&self) -> &str {
            "seed"
        }

        fn required_params(&self) -> &'static [&'static str] {
            &["send_request"]
        }

        async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
            let sender: &Arc<dyn SendRequest> = params.get("send_request").expect("engine-provided");
            let request = Request::get(Url::parse("https://example.com/a").unwrap(), RequestId(1))
                .with_callback(HandlerId::new("record"));
            let _ = sender.send(request).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Record {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for Record {
        fn name(&self) -> &str {
            "record"
        }

        fn required_params(&self) -> &'static [&'static str] {
            &["response"]
        }

        async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
            let _response: &loomcrawl_request::Response = params.get("response").expect("engine-provided");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn entry_function_submits_and_callback_runs() {
        let seed_calls = Arc::new(AtomicUsize::new(0));
        let record_calls = Arc::new(AtomicUsize::new(0));

        let scraper = Scraper::builder_with_adapter(StubAdapter)
            .execution_config(ExecutionConfig::builder().shutdown_check_interval(Duration::from_millis(5)).build())
            .register_handler("record", Record { calls: Arc::clone(&record_calls) })
            .register_scraper("seed", Arc::new(Seed { calls: Arc::clone(&seed_calls) }))
            .build();

        let result = tokio::time::timeout(Duration::from_secs(5), scraper.run()).await;
        assert!(result.is_ok(), "scraper did not finish promptly");
        assert!(result.unwrap().is_ok());
        assert_eq!(seed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(record_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scraper_dependency_resolves_for_entry() {
        struct NeedsDep {
            seen: Arc<std::sync::Mutex<Option<String>>>,
        }

        #[async_trait]
        impl Handler for NeedsDep {
            fn name(&self) -> &str {
                "needs_dep"
            }

            fn required_params(&self) -> &'static [&'static str] {
                &["api_key"]
            }

            async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
                let key: &String = params.get("api_key").expect("checked by resolver");
                *self.seen.lock().unwrap() = Some(key.clone());
                Ok(())
            }
        }

        let seen = Arc::new(std::sync::Mutex::new(None));
        let scraper = Scraper::builder_with_adapter(StubAdapter)
            .execution_config(ExecutionConfig::builder().shutdown_check_interval(Duration::from_millis(5)).build())
            .register_dependency("api_key", "secret-123".to_string())
            .register_scraper("needs_dep", Arc::new(NeedsDep { seen: Arc::clone(&seen) }))
            .build();

        tokio::time::timeout(Duration::from_secs(5), scraper.run()).await.unwrap().unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("secret-123"));
    }
}
