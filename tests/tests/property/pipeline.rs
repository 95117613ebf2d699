//! Property tests for the type-keyed pipeline dispatcher.
//!
//! Invariants tested:
//! - A chain of pipelines always applies every registered pipeline
//!   exactly once, in registration order, regardless of how many are
//!   registered.
//! - `close` invokes every registered pipeline's teardown exactly once,
//!   no matter how many pipelines are registered or in what order.
//! - Strict mode always rejects an unrouted item type; non-strict mode
//!   always passes it through unchanged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use loomcrawl_core::ClientError;
use loomcrawl_pipeline::{Dispatcher, Pipeline, PipelineConfig};
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Counter(i64);

struct Adder(i64);

#[async_trait]
impl Pipeline<Counter> for Adder {
    fn name(&self) -> &str {
        "adder"
    }

    async fn accept_item(&self, item: Counter) -> Counter {
        Counter(item.0 + self.0)
    }
}

struct Closer {
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl Pipeline<Counter> for Closer {
    fn name(&self) -> &str {
        "closer"
    }

    async fn accept_item(&self, item: Counter) -> Counter {
        item
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: every registered pipeline's transform is applied exactly
    /// once, in registration order — the sum of all increments always
    /// lands on the item regardless of how many pipelines were chained.
    #[test]
    fn every_registered_pipeline_runs_exactly_once(
        deltas in prop::collection::vec(-10i64..10, 1..10),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let mut dispatcher = Dispatcher::new(PipelineConfig::default());
            for &delta in &deltas {
                dispatcher.register_pipeline::<Counter, _>(Adder(delta));
            }

            let result = dispatcher.dispatch(Counter(0)).await.unwrap();
            let expected: i64 = deltas.iter().sum();

            prop_assert_eq!(result, Counter(expected));

            Ok(())
        })?;
    }

    /// Property: close() always invokes every pipeline's teardown exactly
    /// once, regardless of how many distinct pipelines are registered.
    #[test]
    fn close_invokes_every_pipeline_exactly_once(
        pipeline_count in 1usize..10,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let mut dispatcher = Dispatcher::new(PipelineConfig::default());
            let mut counters = Vec::new();
            for _ in 0..pipeline_count {
                let closed = Arc::new(AtomicUsize::new(0));
                dispatcher.register_pipeline::<Counter, _>(Closer { closed: Arc::clone(&closed) });
                counters.push(closed);
            }

            dispatcher.close().await;

            for closed in &counters {
                prop_assert_eq!(closed.load(Ordering::SeqCst), 1);
            }

            Ok(())
        })?;
    }

    /// Property: strict mode always rejects an item whose type has no
    /// registered pipeline; non-strict mode always passes it through
    /// unchanged, regardless of the item's value.
    #[test]
    fn routing_mode_governs_unknown_item_handling(
        value in any::<i64>(),
        strict in any::<bool>(),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let dispatcher = Dispatcher::new(PipelineConfig { strict });
            let result = dispatcher.dispatch(Counter(value)).await;

            if strict {
                prop_assert!(matches!(result, Err(ClientError::UnknownItem { .. })));
            } else {
                prop_assert_eq!(result.unwrap(), Counter(value));
            }

            Ok(())
        })?;
    }
}
