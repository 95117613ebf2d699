//! Type-erasure adapters bridging the typed [`crate::pipeline::Pipeline`]/
//! [`crate::pipeline::ItemMiddleware`] traits to the dispatcher's
//! `TypeId`-keyed storage (specification §9 "Type-keyed pipeline
//! routing": "use a type descriptor attached at pipeline registration").

use std::any::Any;
use std::marker::PhantomData;

use async_trait::async_trait;
use loomcrawl_core::PipelineFlow;

use crate::pipeline::{AnyItem, ItemMiddleware, Pipeline};

#[async_trait]
pub(crate) trait ErasedPipeline: Send + Sync {
    fn name(&self) -> &str;
    async fn accept_erased(&self, item: AnyItem) -> AnyItem;
    async fn close(&self);
}

pub(crate) struct TypedPipeline<T, P> {
    inner: P,
    _marker: PhantomData<fn(T)>,
}

impl<T, P> TypedPipeline<T, P> {
    pub(crate) fn new(inner: P) -> Self {
        Self { inner, _marker: PhantomData }
    }
}

#[async_trait]
impl<T, P> ErasedPipeline for TypedPipeline<T, P>
where
    T: Send + 'static,
    P: Pipeline<T>,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn accept_erased(&self, item: AnyItem) -> AnyItem {
        let typed = *item.downcast::<T>().expect("type-keyed dispatch guarantees a matching item type");
        Box::new(self.inner.accept_item(typed).await)
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

#[async_trait]
pub(crate) trait ErasedItemMiddleware: Send + Sync {
    async fn on_item_erased(&self, item: AnyItem) -> PipelineFlow<AnyItem>;
}

pub(crate) struct TypedItemMiddleware<T, M> {
    inner: M,
    _marker: PhantomData<fn(T)>,
}

impl<T, M> TypedItemMiddleware<T, M> {
    pub(crate) fn new(inner: M) -> Self {
        Self { inner, _marker: PhantomData }
    }
}

#[async_trait]
impl<T, M> ErasedItemMiddleware for TypedItemMiddleware<T, M>
where
    T: Send + 'static,
    M: ItemMiddleware<T>,
{
    async fn on_item_erased(&self, item: AnyItem) -> PipelineFlow<AnyItem> {
        let typed = *item.downcast::<T>().expect("type-keyed dispatch guarantees a matching item type");
        match self.inner.on_item(typed).await {
            PipelineFlow::Continue(next) => PipelineFlow::Continue(Box::new(next) as AnyItem),
            PipelineFlow::StopPhase(next) => PipelineFlow::StopPhase(Box::new(next) as AnyItem),
            PipelineFlow::StopItem(next) => PipelineFlow::StopItem(Box::new(next) as AnyItem),
        }
    }
}
