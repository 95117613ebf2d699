//! Wires the scheduler, pipeline dispatcher, and lifespan together and
//! runs them to completion (specification §4.7 "Responsibility: wire
//! everything and run to completion").

use std::sync::Arc;

use loomcrawl_core::{CancellationToken, EventListener, EventListeners, Spawn, TokioSpawn};
use loomcrawl_pipeline::{BoxFuture, Dispatcher as PipelineDispatcher};
use loomcrawl_scheduler::{Dispatch as SchedulerDispatch, Scheduler, SchedulerConfig, SchedulerEvent};

use crate::config::ExecutionConfig;
use crate::error::RunnerError;
use crate::events::ExecutorEvent;
use crate::lifespan::Lifespan;

/// A registered entry function: invoked once at startup with a handle to
/// the now-running scheduler, so it can submit the initial requests
/// (specification §4.7 startup step 3, "they typically submit the initial
/// Requests"). Dependency resolution, if any, has already happened by the
/// time the facade boxes the closure.
pub type Entry<T> = Box<dyn Fn(Arc<Scheduler<T>>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Builds a [`Runner`].
pub struct RunnerBuilder<T, D> {
    lifespan: Arc<dyn Lifespan>,
    scheduler_config: SchedulerConfig,
    scheduler_dispatch: D,
    pipeline: Arc<PipelineDispatcher>,
    execution_config: ExecutionConfig,
    spawner: Arc<dyn Spawn>,
    entries: Vec<(String, Entry<T>)>,
    executor_listeners: EventListeners<ExecutorEvent>,
    scheduler_listeners: EventListeners<SchedulerEvent>,
    cancel: CancellationToken,
    install_signal_handlers: bool,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T, D> RunnerBuilder<T, D>
where
    T: Send + 'static,
    D: SchedulerDispatch<T> + 'static,
{
    /// Starts a builder with the pieces that have no sensible default: the
    /// lifespan context, the scheduler's item dispatcher, and the pipeline
    /// dispatcher.
    pub fn new(lifespan: Arc<dyn Lifespan>, scheduler_dispatch: D, pipeline: Arc<PipelineDispatcher>) -> Self {
        Self {
            lifespan,
            scheduler_config: SchedulerConfig::default(),
            scheduler_dispatch,
            pipeline,
            execution_config: ExecutionConfig::default(),
            spawner: Arc::new(TokioSpawn),
            entries: Vec::new(),
            executor_listeners: EventListeners::new(),
            scheduler_listeners: EventListeners::new(),
            cancel: CancellationToken::new(),
            install_signal_handlers: true,
            _marker: std::marker::PhantomData,
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

    /// Uses `cancel` as the runner's shutdown token instead of a private
    /// one, so an external caller (or a test) can trigger shutdown without
    /// going through [`crate::signal::install`].
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Registers an entry function, invoked once at startup (step 3).
    pub fn entry(mut self, name: impl Into<String>, entry: Entry<T>) -> Self {
        self.entries.push((name.into(), entry));
        self
    }

    /// Controls whether [`Runner::run`] installs its own SIGINT/SIGTERM
    /// handler (specification §5 "the first SIGINT/SIGTERM initiates
    /// graceful shutdown; a second delivered signal triggers immediate
    /// cancellation"). On by default; disable when embedding the runner
    /// in a process that already owns signal handling (e.g. a test
    /// harness, or a host process multiplexing several runners).
    pub fn install_signal_handlers(mut self, install: bool) -> Self {
        self.install_signal_handlers = install;
        self
    }

    pub fn executor_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<ExecutorEvent> + 'static,
    {
        self.executor_listeners.add(listener);
        self
    }

    pub fn scheduler_listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<SchedulerEvent> + 'static,
    {
        self.scheduler_listeners.add(listener);
        self
    }

    pub fn build(self) -> Runner<T, D> {
        Runner {
            lifespan: self.lifespan,
            scheduler_config: self.scheduler_config,
            scheduler_dispatch: self.scheduler_dispatch,
            pipeline: self.pipeline,
            execution_config: self.execution_config,
            spawner: self.spawner,
            entries: self.entries,
            executor_listeners: self.executor_listeners,
            scheduler_listeners: self.scheduler_listeners,
            cancel: self.cancel,
            install_signal_handlers: self.install_signal_handlers,
            _marker: std::marker::PhantomData,
        }
    }
}

/// Owns one run of the engine: lifespan enter, scheduler start, entry
/// invocation, drain-wait, and the mirrored shutdown sequence.
pub struct Runner<T, D> {
    lifespan: Arc<dyn Lifespan>,
    scheduler_config: SchedulerConfig,
    scheduler_dispatch: D,
    pipeline: Arc<PipelineDispatcher>,
    execution_config: ExecutionConfig,
    spawner: Arc<dyn Spawn>,
    entries: Vec<(String, Entry<T>)>,
    executor_listeners: EventListeners<ExecutorEvent>,
    scheduler_listeners: EventListeners<SchedulerEvent>,
    cancel: CancellationToken,
    install_signal_handlers: bool,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T, D> Runner<T, D>
where
    T: Send + 'static,
    D: SchedulerDispatch<T> + 'static,
{
    /// The shared cancellation token driving this runner's shutdown. Clone
    /// it into a signal handler (see [`crate::signal::install`]) or raise
    /// it directly to trigger shutdown programmatically.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the full startup and shutdown sequence to completion
    /// (specification §4.7). Consumes the runner: a [`Runner`] runs
    /// exactly once.
    pub async fn run(self) -> Result<(), RunnerError> {
        let now = || std::time::Instant::now();

        self.executor_listeners.emit(&ExecutorEvent::LifespanSetupStarted { timestamp: now() });
        // Destructured up front: every field below this point is a plain
        // local, so helper functions take exactly what they need instead
        // of borrowing a `self` that has had fields moved out of it.
        let Runner {
            lifespan,
            scheduler_config,
            scheduler_dispatch,
            pipeline,
            execution_config,
            spawner,
            entries,
            executor_listeners,
            scheduler_listeners,
            cancel,
            install_signal_handlers,
            _marker: _,
        } = self;

        let signal_handle = install_signal_handlers.then(|| crate::signal::install(cancel.clone()));

        let setup_result = lifespan.setup().await;
        executor_listeners
            .emit(&ExecutorEvent::LifespanSetupFinished { succeeded: setup_result.is_ok(), timestamp: now() });

        if let Err(err) = setup_result {
            lifespan.teardown().await;
            if let Some(handle) = signal_handle {
                handle.abort();
            }
            return Err(RunnerError::Lifespan(err));
        }

        let scheduler = Arc::new(Scheduler::start_with_listeners(
            scheduler_config,
            scheduler_dispatch,
            scheduler_listeners,
            &*spawner,
        ));
        executor_listeners.emit(&ExecutorEvent::SchedulerStarted { timestamp: now() });

        for (name, entry) in &entries {
            entry(Arc::clone(&scheduler)).await;
            executor_listeners.emit(&ExecutorEvent::EntryInvoked { name: name.clone(), timestamp: now() });
        }

        wait_for_drain_or_signal_or_timeout(&scheduler, &pipeline, &execution_config, &cancel, &executor_listeners)
            .await;
        shutdown(&scheduler, &pipeline, &lifespan, &cancel, &executor_listeners).await;

        if let Some(handle) = signal_handle {
            handle.abort();
        }

        Ok(())
    }
}

async fn wait_for_drain_or_signal_or_timeout<T: Send + 'static>(
    scheduler: &Scheduler<T>,
    pipeline: &PipelineDispatcher,
    execution_config: &ExecutionConfig,
    cancel: &CancellationToken,
    executor_listeners: &EventListeners<ExecutorEvent>,
) {
    let deadline = execution_config.timeout.map(|d| tokio::time::Instant::now() + d);

    loop {
        if scheduler.is_drained().await && pipeline.in_flight_len() == 0 {
            executor_listeners.emit(&ExecutorEvent::Drained { timestamp: std::time::Instant::now() });
            return;
        }

        if cancel.is_shutting_down() {
            executor_listeners.emit(&ExecutorEvent::SignalReceived {
                immediate: cancel.is_immediate(),
                timestamp: std::time::Instant::now(),
            });
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(execution_config.shutdown_check_interval) => {}
            _ = cancel.cancelled() => {
                executor_listeners.emit(&ExecutorEvent::SignalReceived {
                    immediate: cancel.is_immediate(),
                    timestamp: std::time::Instant::now(),
                });
                return;
            }
            _ = wait_deadline(deadline) => {
                executor_listeners.emit(&ExecutorEvent::TimedOut { timestamp: std::time::Instant::now() });
                cancel.cancel_graceful();
                return;
            }
        }
    }
}

async fn shutdown<T: Send + 'static>(
    scheduler: &Arc<Scheduler<T>>,
    pipeline: &PipelineDispatcher,
    lifespan: &Arc<dyn Lifespan>,
    cancel: &CancellationToken,
    executor_listeners: &EventListeners<ExecutorEvent>,
) {
    executor_listeners.emit(&ExecutorEvent::ShutdownStarted { timestamp: std::time::Instant::now() });

    // Step 1+2: stop accepting new work and wait up to
    // `scheduler.close_timeout` for in-flight dispatches. Run on a
    // detached task so a second (immediate) signal doesn't block this
    // call waiting the full close_timeout; the spawned close still runs
    // to completion and forces cancellation on its own schedule.
    let closing = Arc::clone(scheduler);
    let mut close_handle = tokio::spawn(async move { closing.close().await });

    tokio::select! {
        _ = &mut close_handle => {}
        _ = cancel.cancelled_immediately() => {}
    }

    // Step 3: pipeline close, shielded from cancellation internally.
    pipeline.close().await;

    // Step 4: lifespan teardown, shielded.
    lifespan.teardown().await;

    executor_listeners.emit(&ExecutorEvent::ShutdownFinished { timestamp: std::time::Instant::now() });
}

async fn wait_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(instant) => tokio::time::sleep_until(instant).await,
        None => std::future::pending::<()>().await,
    }
}
