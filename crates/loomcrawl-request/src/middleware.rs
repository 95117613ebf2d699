//! Middleware chain: phases, priority/registration ordering, and the
//! short-circuit signals named in the specification's `Middleware` type.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use loomcrawl_core::ControlFlow;

use crate::model::{Request, Response};

/// The lifecycle phase a middleware is registered for (specification §3
/// "Middleware"). Pipeline phases (`pipeline-pre`/`pipeline-post`/
/// `pipeline-global`) live in `loomcrawl-pipeline` instead, since that
/// crate's dispatcher, not the request manager, walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    OuterRequest,
    InnerRequest,
    Response,
    RequestException,
}

/// A request-lifecycle middleware: a named function with an integer
/// priority, invoked in ascending-priority order with ties broken by
/// registration order.
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    /// A human-readable name, used in diagnostics and logging.
    fn name(&self) -> &str;

    /// Lower values run first; ties broken by registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Runs for `Phase::OuterRequest`/`Phase::InnerRequest`: may mutate
    /// the request, short-circuit the phase, or abort the dispatch.
    async fn on_request(&self, request: Request) -> ControlFlow<Request> {
        ControlFlow::Continue(request)
    }

    /// Runs for `Phase::Response`: may mutate the response's owning
    /// request data views via a fresh `Response`, or short-circuit.
    ///
    /// Because a `Response` borrows an `Arc<Request>` rather than owning
    /// mutable request state, response middlewares return the response
    /// itself (usually unchanged) rather than a rebuilt request.
    async fn on_response(&self, response: Response) -> ControlFlow<Response> {
        ControlFlow::Continue(response)
    }

    /// Runs for `Phase::RequestException`, given the request and the
    /// failure that occurred (an HTTP/transport failure, see
    /// `crate::manager::Failure`).
    async fn on_exception(
        &self,
        request: Arc<Request>,
        failure: crate::manager::Failure,
    ) -> ControlFlow<crate::manager::Failure> {
        let _ = request;
        ControlFlow::Continue(failure)
    }
}

/// An ordered, priority-sorted chain of [`RequestMiddleware`]s for one
/// phase. Registration order is preserved as the insertion order, so a
/// stable sort on priority alone reproduces "ascending priority, ties by
/// registration order".
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    entries: Vec<Arc<dyn RequestMiddleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers a middleware. Middlewares are re-sorted by priority
    /// (stable, so registration order is preserved among equal
    /// priorities) after every insertion.
    pub fn register(&mut self, middleware: Arc<dyn RequestMiddleware>) {
        self.entries.push(middleware);
        self.entries
            .sort_by(|a, b| a.priority().cmp(&b.priority()).then(Ordering::Equal));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RequestMiddleware>> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the inner/outer-request phase over `request`, honoring
    /// `StopPhase`/`StopRequest` exactly as specified.
    pub async fn run_request(&self, mut request: Request) -> ControlFlow<Request> {
        for middleware in &self.entries {
            match middleware.on_request(request).await {
                ControlFlow::Continue(next) => request = next,
                ControlFlow::StopPhase(next) => return ControlFlow::Continue(next),
                ControlFlow::StopRequest => return ControlFlow::StopRequest,
            }
        }
        ControlFlow::Continue(request)
    }

    /// Runs the response phase over `response`.
    pub async fn run_response(&self, mut response: Response) -> ControlFlow<Response> {
        for middleware in &self.entries {
            match middleware.on_response(response).await {
                ControlFlow::Continue(next) => response = next,
                ControlFlow::StopPhase(next) => return ControlFlow::Continue(next),
                ControlFlow::StopRequest => return ControlFlow::StopRequest,
            }
        }
        ControlFlow::Continue(response)
    }

    /// Runs the request-exception phase over `failure`.
    pub async fn run_exception(
        &self,
        request: Arc<Request>,
        mut failure: crate::manager::Failure,
    ) -> ControlFlow<crate::manager::Failure> {
        for middleware in &self.entries {
            match middleware.on_exception(Arc::clone(&request), failure).await {
                ControlFlow::Continue(next) => failure = next,
                ControlFlow::StopPhase(next) => return ControlFlow::Continue(next),
                ControlFlow::StopRequest => return ControlFlow::StopRequest,
            }
        }
        ControlFlow::Continue(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestId;
    use std::sync::atomic::{AtomicI32, Ordering as AtomicOrdering};
    use std::sync::Mutex;
    use url::Url;

    struct Recording {
        name: &'static str,
        priority: i32,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl RequestMiddleware for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn on_request(&self, request: Request) -> ControlFlow<Request> {
            self.order.lock().unwrap().push(self.name);
            ControlFlow::Continue(request)
        }
    }

    fn req() -> Request {
        Request::get(Url::parse("https://example.com").unwrap(), RequestId(1))
    }

    #[tokio::test]
    async fn runs_in_ascending_priority_then_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(Arc::new(Recording { name: "b", priority: 5, order: Arc::clone(&order) }));
        chain.register(Arc::new(Recording { name: "a", priority: 1, order: Arc::clone(&order) }));
        chain.register(Arc::new(Recording { name: "c", priority: 5, order: Arc::clone(&order) }));

        chain.run_request(req()).await;
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    struct StopPhaseThenRecord {
        seen: Arc<AtomicI32>,
    }

    #[async_trait]
    impl RequestMiddleware for StopPhaseThenRecord {
        fn name(&self) -> &str {
            "stop-phase"
        }

        async fn on_request(&self, request: Request) -> ControlFlow<Request> {
            self.seen.fetch_add(1, AtomicOrdering::SeqCst);
            ControlFlow::StopPhase(request)
        }
    }

    struct NeverRuns {
        seen: Arc<AtomicI32>,
    }

    #[async_trait]
    impl RequestMiddleware for NeverRuns {
        fn name(&self) -> &str {
            "never"
        }

        fn priority(&self) -> i32 {
            10
        }

        async fn on_request(&self, request: Request) -> ControlFlow<Request> {
            self.seen.fetch_add(100, AtomicOrdering::SeqCst);
            ControlFlow::Continue(request)
        }
    }

    #[tokio::test]
    async fn stop_phase_skips_remaining_middlewares() {
        let seen = Arc::new(AtomicI32::new(0));
        let mut chain = MiddlewareChain::new();
        chain.register(Arc::new(StopPhaseThenRecord { seen: Arc::clone(&seen) }));
        chain.register(Arc::new(NeverRuns { seen: Arc::clone(&seen) }));

        let outcome = chain.run_request(req()).await;
        assert!(outcome.proceeds());
        assert_eq!(seen.load(AtomicOrdering::SeqCst), 1);
    }
}
