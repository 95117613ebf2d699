//! Pipeline and middleware traits (specification §4.5, §9 "Type-keyed
//! pipeline routing" and "Global middleware wrappers").

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use loomcrawl_core::PipelineFlow;

/// A boxed, type-erased item travelling through the dispatcher.
pub type AnyItem = Box<dyn Any + Send>;

/// A future boxed for storage in a trait object, matching the teacher's
/// `BoxFuture`-style erasure at dyn-compatible seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Consumes an item of a specific runtime type and produces the next item
/// of the same type (specification §4.5 step 3, "the returned value
/// becomes the item for the next pipeline").
#[async_trait]
pub trait Pipeline<T: Send + 'static>: Send + Sync {
    /// A human-readable name, used in close diagnostics.
    fn name(&self) -> &str;

    async fn accept_item(&self, item: T) -> T;

    /// Called exactly once at shutdown, in registration order, shielded
    /// from cancellation by the dispatcher.
    async fn close(&self) {}
}

/// A pre- or post-middleware registered for one item type (specification
/// §4.5 steps 2 and 4).
#[async_trait]
pub trait ItemMiddleware<T: Send + 'static>: Send + Sync {
    fn name(&self) -> &str;

    async fn on_item(&self, item: T) -> PipelineFlow<T>;
}

/// A middleware wrapping the *entire* dispatch for every item type
/// (specification §9 "Global middleware wrappers"): `mw(item, next)`
/// where `next` advances the chain once, awaited explicitly so the
/// middleware may run logic both before and after the rest of the chain.
#[async_trait]
pub trait GlobalMiddleware: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, item: AnyItem, next: Next<'_>) -> AnyItem;
}

/// The remaining continuation of the global-middleware fold: the
/// not-yet-run middlewares plus the core function (per-type pre
/// middlewares, pipelines, and post middlewares) they ultimately wrap.
pub struct Next<'a> {
    pub(crate) remaining: &'a [Arc<dyn GlobalMiddleware>],
    pub(crate) core: CoreFn,
}

/// The type-erased core dispatch function built per-call by the
/// dispatcher: pre-middlewares, then each registered pipeline, then
/// post-middlewares for one item's runtime type.
pub(crate) type CoreFn = Arc<dyn Fn(AnyItem) -> BoxFuture<'static, AnyItem> + Send + Sync>;

impl<'a> Next<'a> {
    pub(crate) fn new(remaining: &'a [Arc<dyn GlobalMiddleware>], core: CoreFn) -> Self {
        Self { remaining, core }
    }

    /// Advances the chain by one middleware, or runs the core function if
    /// none remain.
    pub fn call(self, item: AnyItem) -> BoxFuture<'a, AnyItem> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                let middleware = Arc::clone(middleware);
                let core = self.core;
                Box::pin(async move {
                    let next = Next::new(rest, core);
                    middleware.handle(item, next).await
                })
            }
            None => (self.core)(item),
        }
    }
}
