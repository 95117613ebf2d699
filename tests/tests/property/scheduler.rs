//! Property tests for the bounded priority queue and worker pool.
//!
//! Invariants tested:
//! - The number of concurrently in-flight dispatches never exceeds
//!   `concurrent_requests`.
//! - Priority ordering holds even when many items are submitted before
//!   any worker drains the queue.
//! - `close` always leaves the scheduler drained.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use loomcrawl_core::TokioSpawn;
use loomcrawl_scheduler::{Dispatch, Scheduler, SchedulerConfigBuilder};
use proptest::prelude::*;
use tokio::runtime::Runtime;
use tokio::sync::Barrier;

struct ConcurrencyTracker {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    gate: Arc<tokio::sync::Semaphore>,
}

impl Dispatch<u32> for ConcurrencyTracker {
    async fn dispatch(&self, _item: u32) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _ = self.gate.acquire().await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Property: peak concurrent dispatches never exceeds `concurrent_requests`.
    #[test]
    fn concurrency_bound_is_never_exceeded(
        concurrent_requests in 1usize..=8,
        submissions in 1usize..=40,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let current = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let gate = Arc::new(tokio::sync::Semaphore::new(0));

            let config = SchedulerConfigBuilder::new()
                .concurrent_requests(concurrent_requests)
                .pending_requests(submissions + 1)
                .ready_queue_max_size(submissions + 1)
                .build();
            let scheduler = Scheduler::start(
                config,
                ConcurrencyTracker { current: Arc::clone(&current), peak: Arc::clone(&peak), gate: Arc::clone(&gate) },
                &TokioSpawn,
            );

            for i in 0..submissions {
                scheduler.submit(0, i as u32).await.unwrap();
            }

            // Let every worker claim an item and block on the gate.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            gate.add_permits(submissions);
            scheduler.close().await;

            prop_assert!(
                peak.load(Ordering::SeqCst) <= concurrent_requests,
                "peak concurrency {} exceeded configured bound {}",
                peak.load(Ordering::SeqCst),
                concurrent_requests
            );

            Ok(())
        })?;
    }

    /// Property: with a single worker, items submitted before the worker
    /// starts draining come out in strictly ascending priority order
    /// (lower values first), regardless of submission order.
    #[test]
    fn priority_ordering_holds_under_saturation(
        mut priorities in prop::collection::vec(-20i32..20, 1..30),
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            struct Recording {
                order: Arc<std::sync::Mutex<Vec<i32>>>,
                barrier: Arc<Barrier>,
            }
            impl Dispatch<i32> for Recording {
                async fn dispatch(&self, item: i32) {
                    self.barrier.wait().await;
                    self.order.lock().unwrap().push(item);
                }
            }

            let barrier = Arc::new(Barrier::new(2));
            let order = Arc::new(std::sync::Mutex::new(Vec::new()));
            let config = SchedulerConfigBuilder::new()
                .concurrent_requests(1)
                .pending_requests(priorities.len() + 1)
                .ready_queue_max_size(priorities.len() + 1)
                .build();
            let scheduler = Scheduler::start(
                config,
                Recording { order: Arc::clone(&order), barrier: Arc::clone(&barrier) },
                &TokioSpawn,
            );

            // The first submission is immediately picked up by the lone
            // worker and blocks on the barrier, so every remaining
            // submission lands in the ready queue before any dispatch
            // completes, guaranteeing priority order governs the rest.
            for &p in &priorities {
                scheduler.submit(p, p).await.unwrap();
            }
            for _ in 0..priorities.len() {
                barrier.wait().await;
            }
            scheduler.close().await;

            let recorded = order.lock().unwrap().clone();
            priorities.sort_unstable();
            prop_assert_eq!(recorded, priorities);

            Ok(())
        })?;
    }

    /// Property: after `close`, the scheduler reports itself drained and
    /// rejects further submissions.
    #[test]
    fn close_always_drains(
        submissions in 0usize..20,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            struct Noop;
            impl Dispatch<u32> for Noop {
                async fn dispatch(&self, _item: u32) {}
            }

            let config = SchedulerConfigBuilder::new()
                .concurrent_requests(4)
                .pending_requests(submissions + 1)
                .ready_queue_max_size(submissions + 1)
                .build();
            let scheduler = Scheduler::start(config, Noop, &TokioSpawn);

            for i in 0..submissions {
                scheduler.submit(0, i as u32).await.unwrap();
            }
            scheduler.close().await;

            prop_assert!(scheduler.is_drained().await);
            prop_assert!(scheduler.submit(0, 0).await.is_err());

            Ok(())
        })?;
    }
}
