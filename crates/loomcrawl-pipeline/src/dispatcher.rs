//! The type-keyed pipeline dispatcher (specification §4.5).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use loomcrawl_core::{ClientError, EventListener, EventListeners, PipelineFlow};

use crate::config::PipelineConfig;
use crate::erased::{ErasedItemMiddleware, ErasedPipeline, TypedItemMiddleware, TypedPipeline};
use crate::events::PipelineEvent;
use crate::pipeline::{AnyItem, BoxFuture, GlobalMiddleware, ItemMiddleware, Next, Pipeline};

type PipelineList = Arc<Vec<Arc<dyn ErasedPipeline>>>;
type MiddlewareList = Arc<Vec<Arc<dyn ErasedItemMiddleware>>>;

/// Brackets one `dispatch` call's lifetime around the `in_flight` counter,
/// decrementing on every exit path including early returns.
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Maps runtime item types to their registered pipelines and per-type
/// middlewares, and walks the global-middleware chain around each
/// dispatch (specification §4.5 steps 1-5).
pub struct Dispatcher {
    pipelines: HashMap<TypeId, PipelineList>,
    pre: HashMap<TypeId, MiddlewareList>,
    post: HashMap<TypeId, MiddlewareList>,
    global: Vec<Arc<dyn GlobalMiddleware>>,
    /// Flat registration order across all types, for shutdown `close()`.
    close_order: Vec<Arc<dyn ErasedPipeline>>,
    config: PipelineConfig,
    listeners: EventListeners<PipelineEvent>,
    in_flight: AtomicUsize,
}

impl Dispatcher {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipelines: HashMap::new(),
            pre: HashMap::new(),
            post: HashMap::new(),
            global: Vec::new(),
            close_order: Vec::new(),
            config,
            listeners: EventListeners::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Returns the number of dispatches currently in progress (a chain
    /// that has started but not yet returned). Used by the executor to
    /// decide when the pipeline queue has drained.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: EventListener<PipelineEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Registers `pipeline` for item type `T`, in call order.
    pub fn register_pipeline<T, P>(&mut self, pipeline: P)
    where
        T: Send + 'static,
        P: Pipeline<T> + 'static,
    {
        let erased: Arc<dyn ErasedPipeline> = Arc::new(TypedPipeline::<T, P>::new(pipeline));
        self.close_order.push(Arc::clone(&erased));
        let list = Arc::make_mut(self.pipelines.entry(TypeId::of::<T>()).or_insert_with(|| Arc::new(Vec::new())));
        list.push(erased);
    }

    /// Registers a pre-middleware for item type `T`.
    pub fn register_pre_middleware<T, M>(&mut self, middleware: M)
    where
        T: Send + 'static,
        M: ItemMiddleware<T> + 'static,
    {
        let erased: Arc<dyn ErasedItemMiddleware> = Arc::new(TypedItemMiddleware::<T, M>::new(middleware));
        let list = Arc::make_mut(self.pre.entry(TypeId::of::<T>()).or_insert_with(|| Arc::new(Vec::new())));
        list.push(erased);
    }

    /// Registers a post-middleware for item type `T`.
    pub fn register_post_middleware<T, M>(&mut self, middleware: M)
    where
        T: Send + 'static,
        M: ItemMiddleware<T> + 'static,
    {
        let erased: Arc<dyn ErasedItemMiddleware> = Arc::new(TypedItemMiddleware::<T, M>::new(middleware));
        let list = Arc::make_mut(self.post.entry(TypeId::of::<T>()).or_insert_with(|| Arc::new(Vec::new())));
        list.push(erased);
    }

    /// Registers a global middleware, applied to every item type,
    /// regardless of runtime type, in registration order.
    pub fn register_global_middleware<M>(&mut self, middleware: M)
    where
        M: GlobalMiddleware + 'static,
    {
        self.global.push(Arc::new(middleware));
    }

    /// Dispatches `item` through the global-middleware chain and, for its
    /// runtime type, the pre-middlewares, registered pipelines, and
    /// post-middlewares, per specification §4.5.
    pub async fn dispatch<T: Send + 'static>(&self, item: T) -> Result<T, ClientError> {
        let _guard = InFlightGuard::new(&self.in_flight);
        let type_id = TypeId::of::<T>();

        let Some(pipelines) = self.pipelines.get(&type_id).cloned() else {
            if self.config.strict {
                return Err(ClientError::UnknownItem { type_name: std::any::type_name::<T>() });
            }
            self.listeners.emit(&PipelineEvent::UnknownItemPassthrough {
                type_name: std::any::type_name::<T>(),
                timestamp: Instant::now(),
            });
            return Ok(item);
        };

        let pre = self.pre.get(&type_id).cloned().unwrap_or_default();
        let post = self.post.get(&type_id).cloned().unwrap_or_default();

        let core = build_core(pre, pipelines, post);
        let next = Next::new(&self.global, core);

        let boxed: AnyItem = Box::new(item);
        let result = next.call(boxed).await;
        Ok(*result.downcast::<T>().expect("type-keyed dispatch guarantees a matching item type"))
    }

    /// Calls every registered pipeline's `close` exactly once, in overall
    /// registration order, shielded from the caller's own cancellation by
    /// running the teardown on a detached task (the same shielding idiom
    /// used for lifespan teardown in `loomcrawl-executor`).
    pub async fn close(&self) {
        let pipelines = self.close_order.clone();
        let listeners = self.listeners.clone();
        let handle = tokio::spawn(async move {
            for pipeline in pipelines {
                pipeline.close().await;
                listeners.emit(&PipelineEvent::PipelineClosed {
                    pipeline: pipeline.name().to_string(),
                    timestamp: Instant::now(),
                });
            }
        });
        let _ = handle.await;
    }
}

fn build_core(pre: MiddlewareList, pipelines: PipelineList, post: MiddlewareList) -> crate::pipeline::CoreFn {
    Arc::new(move |item: AnyItem| -> BoxFuture<'static, AnyItem> {
        let pre = Arc::clone(&pre);
        let pipelines = Arc::clone(&pipelines);
        let post = Arc::clone(&post);
        Box::pin(async move {
            let mut item = item;

            for middleware in pre.iter() {
                match middleware.on_item_erased(item).await {
                    PipelineFlow::Continue(next) => item = next,
                    PipelineFlow::StopPhase(next) => {
                        item = next;
                        break;
                    }
                    PipelineFlow::StopItem(next) => return next,
                }
            }

            for pipeline in pipelines.iter() {
                item = pipeline.accept_erased(item).await;
            }

            for middleware in post.iter() {
                match middleware.on_item_erased(item).await {
                    PipelineFlow::Continue(next) => item = next,
                    PipelineFlow::StopPhase(next) => {
                        item = next;
                        break;
                    }
                    PipelineFlow::StopItem(next) => return next,
                }
            }

            item
        })
    })
}
