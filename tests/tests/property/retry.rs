//! Property tests for the retry middleware.
//!
//! Invariants tested:
//! - A failure is never resubmitted more times than `max_attempts` allows
//!   — eventually the errback (here: the untouched failure passing
//!   through) is what's observed.
//! - A non-triggering status is never retried, regardless of budget.
//! - `stop_after_reenqueue` always aborts the request once a retry is
//!   scheduled, independent of the backoff kind in use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use loomcrawl_request::{Failure, Request, RequestId, Response, SendRequest};
use loomcrawl_retry::{BackoffKind, RetryConfig, RetryMiddleware};
use loomcrawl_scheduler::SchedulerError;
use proptest::prelude::*;
use tokio::runtime::Builder;
use url::Url;

struct RecordingSender {
    resubmits: AtomicUsize,
}

#[async_trait]
impl SendRequest for RecordingSender {
    async fn send(&self, _request: Request) -> Result<(), SchedulerError> {
        unreachable!("the retry middleware never calls send, only resubmit")
    }

    async fn resubmit(&self, _request: Request) -> Result<(), SchedulerError> {
        self.resubmits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn failure_with_status(status: StatusCode) -> Failure {
    let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
    let response = Response::new(request, Url::parse("https://example.com").unwrap(), status, HeaderMap::new(), Bytes::new());
    Failure::Http(response)
}

fn paused_runtime() -> tokio::runtime::Runtime {
    Builder::new_current_thread().enable_all().start_paused(true).build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: a single exception phase invocation resubmits at most
    /// once, and only when the request's current attempt is still under
    /// budget.
    #[test]
    fn resubmission_respects_the_attempt_budget(
        max_attempts in 1u32..10,
        current_attempt in 0u32..15,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let sender = Arc::new(RecordingSender { resubmits: AtomicUsize::new(0) });
            let config = RetryConfig::builder()
                .max_attempts(max_attempts)
                .backoff(BackoffKind::Constant { base_delay: std::time::Duration::from_millis(1) })
                .build();
            let middleware = RetryMiddleware::new(config, sender.clone());

            let mut request = Request::get(Url::parse("https://example.com").unwrap(), RequestId(1));
            request.meta.attempt = current_attempt;

            middleware
                .on_exception(Arc::new(request), failure_with_status(StatusCode::SERVICE_UNAVAILABLE))
                .await;

            let resubmitted = sender.resubmits.load(Ordering::SeqCst) == 1;
            prop_assert_eq!(resubmitted, current_attempt < max_attempts);

            Ok(())
        })?;
    }

    /// Property: a status outside the configured trigger set is never
    /// retried, no matter how much budget remains.
    #[test]
    fn non_trigger_statuses_are_never_retried(
        max_attempts in 1u32..10,
        raw_status in prop::sample::select(vec![200u16, 301, 400, 403, 404, 418]),
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let sender = Arc::new(RecordingSender { resubmits: AtomicUsize::new(0) });
            let config = RetryConfig::builder().max_attempts(max_attempts).build();
            let middleware = RetryMiddleware::new(config, sender.clone());

            let status = StatusCode::from_u16(raw_status).unwrap();
            let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
            middleware.on_exception(request, failure_with_status(status)).await;

            prop_assert_eq!(sender.resubmits.load(Ordering::SeqCst), 0);

            Ok(())
        })?;
    }

    /// Property: whenever `stop_after_reenqueue` is set and a retry is
    /// actually scheduled, the dispatch is always aborted — regardless of
    /// which backoff kind produced the delay.
    #[test]
    fn stop_after_reenqueue_always_aborts_once_scheduled(
        backoff_millis in 1u64..50,
        use_linear in any::<bool>(),
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let backoff = if use_linear {
                BackoffKind::Linear { base_delay: std::time::Duration::from_millis(backoff_millis) }
            } else {
                BackoffKind::Constant { base_delay: std::time::Duration::from_millis(backoff_millis) }
            };
            let sender = Arc::new(RecordingSender { resubmits: AtomicUsize::new(0) });
            let config = RetryConfig::builder()
                .max_attempts(5)
                .backoff(backoff)
                .stop_after_reenqueue(true)
                .build();
            let middleware = RetryMiddleware::new(config, sender.clone());

            let request = Arc::new(Request::get(Url::parse("https://example.com").unwrap(), RequestId(1)));
            let outcome = middleware.on_exception(request, failure_with_status(StatusCode::SERVICE_UNAVAILABLE)).await;

            prop_assert_eq!(sender.resubmits.load(Ordering::SeqCst), 1);
            prop_assert!(!outcome.proceeds());

            Ok(())
        })?;
    }
}
