//! The retry middleware (specification §4.4): registered in the
//! request-exception phase, decides whether a failure should be retried
//! and re-submits the request if so.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use loomcrawl_core::{CancellationToken, ControlFlow, EventListener, EventListeners};
use loomcrawl_request::{Failure, Request, RequestMiddleware, SendRequest};

use crate::config::{RetryConfig, RETRY_AFTER_CAP};
use crate::events::RetryEvent;

/// Decides whether a [`Failure`] should be retried, sleeps the computed
/// backoff, and re-submits the request via [`SendRequest::resubmit`] —
/// bypassing outer-request middlewares so the re-submission preserves the
/// request's identity, exactly as the specification requires.
pub struct RetryMiddleware {
    config: RetryConfig,
    sender: Arc<dyn SendRequest>,
    cancellation: Option<CancellationToken>,
    listeners: EventListeners<RetryEvent>,
}

impl RetryMiddleware {
    pub fn new(config: RetryConfig, sender: Arc<dyn SendRequest>) -> Self {
        Self { config, sender, cancellation: None, listeners: EventListeners::new() }
    }

    /// Attaches a shutdown token so a pending backoff sleep is abandoned
    /// (no re-submission) once immediate shutdown is requested, instead of
    /// delaying the engine's exit.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: EventListener<RetryEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    fn triggers(&self, failure: &Failure) -> bool {
        match failure.status() {
            Some(status) => self.config.triggers_on_status(status),
            None => self.config.retry_on_transport_error,
        }
    }
}

#[async_trait]
impl RequestMiddleware for RetryMiddleware {
    fn name(&self) -> &str {
        "retry"
    }

    async fn on_exception(&self, request: Arc<Request>, failure: Failure) -> ControlFlow<Failure> {
        if !self.triggers(&failure) {
            return ControlFlow::Continue(failure);
        }

        let attempt = request.meta.attempt;
        if attempt >= self.config.max_attempts() {
            self.listeners.emit(&RetryEvent::Exhausted { id: request.meta.id.0, attempt, timestamp: Instant::now() });
            return ControlFlow::Continue(failure);
        }

        let delay = failure
            .retry_after()
            .map(|retry_after| retry_after.min(RETRY_AFTER_CAP))
            .unwrap_or_else(|| self.config.interval.next_interval(attempt));

        if let Some(cancellation) = &self.cancellation {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancellation.cancelled_immediately() => return ControlFlow::Continue(failure),
            }
        } else {
            tokio::time::sleep(delay).await;
        }

        let retry_request = request.retry_clone();
        let next_attempt = retry_request.meta.attempt;

        if self.sender.resubmit(retry_request).await.is_err() {
            // The scheduler is already shutting down; nothing more to do
            // than let this failure pass through to the errback.
            return ControlFlow::Continue(failure);
        }

        self.listeners.emit(&RetryEvent::Scheduled {
            id: request.meta.id.0,
            attempt: next_attempt,
            delay,
            timestamp: Instant::now(),
        });

        if self.config.stop_after_reenqueue {
            ControlFlow::StopRequest
        } else {
            ControlFlow::Continue(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::ConstantInterval;
    use crate::config::BackoffKind;
    use loomcrawl_request::RequestId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use url::Url;

    struct RecordingSender {
        resubmitted: Mutex<Vec<u32>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SendRequest for RecordingSender {
        async fn send(&self, _request: Request) -> Result<(), loomcrawl_scheduler::SchedulerError> {
            unreachable!("outer middleware path not exercised by retry tests")
        }

        async fn resubmit(&self, request: Request) -> Result<(), loomcrawl_scheduler::SchedulerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.resubmitted.lock().unwrap().push(request.meta.attempt);
            Ok(())
        }
    }

    fn failure(status: http::StatusCode) -> Failure {
        let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
        let response = loomcrawl_request::Response::new(
            request,
            Url::parse("https://example.com").unwrap(),
            status,
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );
        Failure::Http(response)
    }

    #[tokio::test(start_paused = true)]
    async fn retries_within_budget_and_resubmits() {
        let sender = Arc::new(RecordingSender { resubmitted: Mutex::new(Vec::new()), calls: AtomicUsize::new(0) });
        let config = RetryConfig::builder()
            .max_attempts(2)
            .backoff(BackoffKind::Constant { base_delay: std::time::Duration::from_secs(1) })
            .build();
        let middleware = RetryMiddleware::new(config, sender.clone());

        let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(9)));
        let outcome = middleware.on_exception(Arc::clone(&request), failure(http::StatusCode::SERVICE_UNAVAILABLE)).await;

        assert!(outcome.proceeds());
        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*sender.resubmitted.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn exhausted_attempts_do_not_resubmit() {
        let sender = Arc::new(RecordingSender { resubmitted: Mutex::new(Vec::new()), calls: AtomicUsize::new(0) });
        let config = RetryConfig::builder().max_attempts(1).build();
        let middleware = RetryMiddleware::new(config, sender.clone());

        let mut request = Request::get(Url::parse("https://example.com").unwrap(), RequestId(9));
        request.meta.attempt = 1;
        let outcome = middleware.on_exception(Arc::new(request), failure(http::StatusCode::SERVICE_UNAVAILABLE)).await;

        assert!(outcome.proceeds());
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_trigger_status_passes_through_untouched() {
        let sender = Arc::new(RecordingSender { resubmitted: Mutex::new(Vec::new()), calls: AtomicUsize::new(0) });
        let config = RetryConfig::builder().build();
        let middleware = RetryMiddleware::new(config, sender.clone());

        let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
        let outcome = middleware.on_exception(request, failure(http::StatusCode::NOT_FOUND)).await;

        assert!(outcome.proceeds());
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_reenqueue_aborts_request() {
        let sender = Arc::new(RecordingSender { resubmitted: Mutex::new(Vec::new()), calls: AtomicUsize::new(0) });
        let config = RetryConfig::builder()
            .backoff(BackoffKind::Constant { base_delay: std::time::Duration::from_millis(1) })
            .stop_after_reenqueue(true)
            .build();
        let middleware = RetryMiddleware::new(config, sender);

        let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
        let outcome = middleware.on_exception(request, failure(http::StatusCode::SERVICE_UNAVAILABLE)).await;

        assert!(!outcome.proceeds());
    }

    #[test]
    fn constant_interval_is_reexported() {
        let _ = ConstantInterval::new(std::time::Duration::from_secs(1));
    }
}
