//! The bounded priority queue and worker pool.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use loomcrawl_core::{CancellationToken, EventListeners, SequenceCounter, Spawn};
use tokio::sync::{Mutex, Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::events::SchedulerEvent;
use crate::heap::HeapEntry;

/// Receives items popped from the scheduler in priority order and does
/// whatever dispatching them means (hand off to the request manager, in
/// the full engine).
pub trait Dispatch<T>: Send + Sync {
    /// Dispatches one item. Errors are the dispatcher's concern to log or
    /// otherwise surface; the scheduler itself only cares that this
    /// future eventually completes.
    fn dispatch(&self, item: T) -> impl std::future::Future<Output = ()> + Send;
}

struct QueuedItem<T> {
    item: T,
    seq: u64,
    _permit: OwnedSemaphorePermit,
}

struct Inner<T> {
    heap: Mutex<BinaryHeap<HeapEntry<QueuedItem<T>>>>,
    notify: Notify,
    seq: SequenceCounter,
    pending: Arc<Semaphore>,
    cancel: CancellationToken,
    config: SchedulerConfig,
    listeners: EventListeners<SchedulerEvent>,
    in_flight: AtomicUsize,
}

/// A bounded priority queue feeding a worker pool, generic over the
/// queued item type `T`.
pub struct Scheduler<T> {
    inner: Arc<Inner<T>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates a scheduler and starts its worker pool, which begins
    /// pulling from `dispatcher`.
    pub fn start<D>(config: SchedulerConfig, dispatcher: D, spawner: &dyn Spawn) -> Self
    where
        D: Dispatch<T> + 'static,
    {
        Self::start_with_listeners(config, dispatcher, EventListeners::new(), spawner)
    }

    /// Like [`Self::start`], but with event listeners pre-registered.
    pub fn start_with_listeners<D>(
        config: SchedulerConfig,
        dispatcher: D,
        listeners: EventListeners<SchedulerEvent>,
        spawner: &dyn Spawn,
    ) -> Self
    where
        D: Dispatch<T> + 'static,
    {
        let pending = Arc::new(Semaphore::new(config.pending_requests));
        let inner = Arc::new(Inner {
            heap: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
            seq: SequenceCounter::new(),
            pending,
            cancel: CancellationToken::new(),
            config,
            listeners,
            in_flight: AtomicUsize::new(0),
        });

        let dispatcher = Arc::new(dispatcher);
        let mut workers = Vec::with_capacity(inner.config.concurrent_requests);
        for worker_id in 0..inner.config.concurrent_requests {
            let inner = Arc::clone(&inner);
            let dispatcher = Arc::clone(&dispatcher);
            workers.push(spawner.spawn(worker_loop(inner, dispatcher, worker_id)));
        }

        Self {
            inner,
            workers: Mutex::new(workers),
        }
    }

    /// Submits an item at the given priority (lower integers dispatch
    /// first). Suspends the caller while the soft `pending_requests` cap
    /// is exhausted; fails immediately if the hard `ready_queue_max_size`
    /// cap is reached, or if `close` has already been called.
    pub async fn submit(&self, priority: i32, item: T) -> Result<(), SchedulerError> {
        if self.inner.cancel.is_shutting_down() {
            return Err(SchedulerError::ShutdownInProgress);
        }

        {
            let heap = self.inner.heap.lock().await;
            if heap.len() >= self.inner.config.ready_queue_max_size {
                return Err(SchedulerError::QueueFull {
                    max_size: self.inner.config.ready_queue_max_size,
                });
            }
        }

        let permit = Arc::clone(&self.inner.pending)
            .acquire_owned()
            .await
            .expect("pending_requests semaphore is never closed while the scheduler is alive");

        // Re-check after the (possibly suspending) permit acquire: close()
        // may have been called while we were waiting.
        if self.inner.cancel.is_shutting_down() {
            return Err(SchedulerError::ShutdownInProgress);
        }

        let seq = self.inner.seq.next();
        let entry = HeapEntry::new(priority, seq, QueuedItem { item, seq, _permit: permit });

        {
            let mut heap = self.inner.heap.lock().await;
            heap.push(entry);
        }
        self.inner.notify.notify_one();

        self.inner.listeners.emit(&SchedulerEvent::Submitted {
            priority,
            seq,
            timestamp: std::time::Instant::now(),
        });

        Ok(())
    }

    /// Stops accepting new submissions and waits up to `close_timeout`
    /// (from the scheduler's configuration) for in-flight and queued work
    /// to drain, then cancels any workers still running.
    ///
    /// Idempotent: a second call observes the already-terminal state and
    /// returns immediately.
    pub async fn close(&self) {
        self.inner.cancel.cancel_graceful();
        self.inner.notify.notify_waiters();

        self.inner.listeners.emit(&SchedulerEvent::CloseStarted {
            timestamp: std::time::Instant::now(),
        });

        let mut workers = self.workers.lock().await;
        if workers.is_empty() {
            return;
        }

        let drained = tokio::time::timeout(self.inner.config.close_timeout, async {
            for handle in workers.drain(..) {
                let _ = handle.await;
            }
        })
        .await;

        let forced = drained.is_err();
        if forced {
            self.inner.cancel.cancel_immediate();
            self.inner.notify.notify_waiters();
            for handle in workers.drain(..) {
                handle.abort();
            }
        }

        self.inner.listeners.emit(&SchedulerEvent::CloseFinished {
            forced,
            timestamp: std::time::Instant::now(),
        });
    }

    /// Returns `true` once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_shutting_down()
    }

    /// Returns the current number of ready (not yet dispatched) items.
    pub async fn ready_len(&self) -> usize {
        self.inner.heap.lock().await.len()
    }

    /// Returns the number of items a worker has popped but not yet
    /// finished dispatching.
    pub fn in_flight_len(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Returns `true` when the ready queue is empty and no worker has an
    /// in-flight dispatch — the drain condition the executor waits on
    /// during shutdown.
    pub async fn is_drained(&self) -> bool {
        self.ready_len().await == 0 && self.in_flight_len() == 0
    }
}

async fn next_item<T>(inner: &Inner<T>) -> Option<QueuedItem<T>> {
    loop {
        {
            let mut heap = inner.heap.lock().await;
            if let Some(entry) = heap.pop() {
                return Some(entry.item);
            }
            if inner.cancel.is_shutting_down() {
                return None;
            }
        }

        tokio::select! {
            _ = inner.notify.notified() => {}
            _ = inner.cancel.cancelled() => {}
        }
    }
}

async fn worker_loop<T, D>(inner: Arc<Inner<T>>, dispatcher: Arc<D>, worker_id: usize)
where
    T: Send + 'static,
    D: Dispatch<T>,
{
    loop {
        let Some(queued) = next_item(&inner).await else {
            return;
        };

        let seq = queued.seq;
        inner.listeners.emit(&SchedulerEvent::DispatchStarted {
            seq,
            worker: worker_id,
            timestamp: std::time::Instant::now(),
        });

        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let dispatch_future = dispatcher.dispatch(queued.item);
        tokio::select! {
            biased;
            _ = inner.cancel.cancelled_immediately() => {
                inner.listeners.emit(&SchedulerEvent::DispatchCancelled {
                    seq,
                    worker: worker_id,
                    timestamp: std::time::Instant::now(),
                });
            }
            _ = dispatch_future => {
                inner.listeners.emit(&SchedulerEvent::DispatchFinished {
                    seq,
                    worker: worker_id,
                    timestamp: std::time::Instant::now(),
                });
            }
        }
        inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        // `queued._permit` (moved into the dispatch future's captured
        // `queued.item` sibling) is dropped here, releasing one
        // `pending_requests` slot.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfigBuilder;
    use loomcrawl_core::TokioSpawn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    struct RecordingDispatch {
        order: Arc<StdMutex<Vec<i32>>>,
    }

    impl Dispatch<i32> for RecordingDispatch {
        async fn dispatch(&self, item: i32) {
            self.order.lock().unwrap().push(item);
        }
    }

    #[tokio::test]
    async fn dispatches_in_priority_order() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let config = SchedulerConfigBuilder::new().concurrent_requests(1).build();
        let scheduler = Scheduler::start(config, RecordingDispatch { order: Arc::clone(&order) }, &TokioSpawn);

        // Stall the single worker so both submissions land before either
        // is popped, proving priority (not submission order) wins.
        scheduler.submit(5, 1).await.unwrap();
        scheduler.submit(1, 2).await.unwrap();

        scheduler.close().await;
        assert_eq!(*order.lock().unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn submit_after_close_is_rejected() {
        let config = SchedulerConfigBuilder::new().build();
        let order = Arc::new(StdMutex::new(Vec::new()));
        let scheduler = Scheduler::start(config, RecordingDispatch { order }, &TokioSpawn);
        scheduler.close().await;

        let err = scheduler.submit(1, 42).await.unwrap_err();
        assert!(err.is_shutdown_in_progress());
    }

    #[tokio::test]
    async fn hard_cap_rejects_without_suspending() {
        struct Blocking {
            gate: Arc<tokio::sync::Semaphore>,
        }
        impl Dispatch<i32> for Blocking {
            async fn dispatch(&self, _item: i32) {
                let _ = self.gate.acquire().await;
            }
        }

        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let config = SchedulerConfigBuilder::new()
            .concurrent_requests(1)
            .ready_queue_max_size(1)
            .pending_requests(2)
            .build();
        let scheduler = Scheduler::start(config, Blocking { gate: Arc::clone(&gate) }, &TokioSpawn);

        scheduler.submit(1, 1).await.unwrap();
        tokio::task::yield_now().await;
        scheduler.submit(1, 2).await.unwrap();

        let err = scheduler.submit(1, 3).await.unwrap_err();
        assert!(err.is_queue_full());

        gate.add_permits(10);
        scheduler.close().await;
    }

    #[test]
    fn worker_count_matches_config() {
        let counter = AtomicUsize::new(0);
        counter.fetch_add(1, Ordering::SeqCst);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
