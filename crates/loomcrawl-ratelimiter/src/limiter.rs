//! The per-group rate limiter: fixed-interval pacing, with optional
//! EWMA+AIMD adaptation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use loomcrawl_core::Spawn;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

use crate::config::{RateLimiterConfig, RETRY_AFTER_CAP};
use crate::events::{AdaptReason, RateLimiterEvent};
use crate::group::{GroupKey, GroupKeyFn, GroupSource, HostGroupKeyFn};
use loomcrawl_core::EventListeners;

/// The outcome of one dispatch, as classified by the caller (request
/// manager or retry middleware) against its own trigger configuration.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// The request succeeded; `latency` feeds the EWMA.
    Success { latency: Duration },
    /// The request hit a configured failure trigger (status or exception
    /// kind), with no usable `Retry-After`.
    Failure,
    /// A `Retry-After` value was present on a 429/503 response and the
    /// policy allows honoring it.
    RetryAfter(Duration),
}

struct GroupState {
    last_dispatch_time: Option<Instant>,
    interval: Duration,
    consecutive_successes: u32,
    ewma_latency: Option<Duration>,
    last_activity: Instant,
}

impl GroupState {
    fn new(base_interval: Duration, now: Instant) -> Self {
        Self {
            last_dispatch_time: None,
            interval: base_interval,
            consecutive_successes: 0,
            ewma_latency: None,
            last_activity: now,
        }
    }
}

/// Per-group pacing and adaptation, generic over the dispatch-source type
/// `S` (typically `loomcrawl_request::model::Request`).
pub struct RateLimiter<S: GroupSource> {
    config: RateLimiterConfig,
    key_fn: Arc<dyn GroupKeyFn<S>>,
    groups: StdMutex<HashMap<GroupKey, Arc<AsyncMutex<GroupState>>>>,
    listeners: EventListeners<RateLimiterEvent>,
}

impl<S: GroupSource> RateLimiter<S> {
    /// Creates a limiter using the default host-based group-key function.
    pub fn new(config: RateLimiterConfig) -> Self
    where
        HostGroupKeyFn: GroupKeyFn<S>,
    {
        Self::with_group_key_fn(config, HostGroupKeyFn)
    }

    /// Creates a limiter using a custom group-key function.
    pub fn with_group_key_fn(config: RateLimiterConfig, key_fn: impl GroupKeyFn<S> + 'static) -> Self {
        Self {
            config,
            key_fn: Arc::new(key_fn),
            groups: StdMutex::new(HashMap::new()),
            listeners: EventListeners::new(),
        }
    }

    /// Registers an event listener. Call before sharing the limiter.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: loomcrawl_core::EventListener<RateLimiterEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    fn group_handle(&self, key: &GroupKey, base_interval: Duration, now: Instant) -> Arc<AsyncMutex<GroupState>> {
        let mut groups = self.groups.lock().expect("rate limiter group map poisoned");
        groups
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(GroupState::new(base_interval, now))))
            .clone()
    }

    /// Waits until `source`'s group next permits a dispatch, then records
    /// that a dispatch is happening now. Returns immediately when rate
    /// limiting is disabled, or when the group's interval is zero.
    pub async fn acquire(&self, source: &S) {
        if !self.config.enabled {
            return;
        }

        let (group, base_interval) = self.key_fn.group_for(source, self.config.default_interval);
        let handle = self.group_handle(&group, base_interval, Instant::now());

        let mut state = handle.lock().await;
        let now = Instant::now();
        state.last_activity = now;

        let interval = state.interval;
        if interval.is_zero() {
            state.last_dispatch_time = Some(now);
            return;
        }

        let earliest = state
            .last_dispatch_time
            .map(|last| last + interval)
            .unwrap_or(now);
        let wait = earliest.saturating_duration_since(now);

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let dispatch_time = now + wait;
        state.last_dispatch_time = Some(dispatch_time);

        self.listeners.emit(&RateLimiterEvent::Acquired {
            group,
            waited: wait,
            interval,
            timestamp: std::time::Instant::now(),
        });
    }

    /// Records the outcome of a dispatch for `source`'s group, applying
    /// the EWMA+AIMD adaptation rules. A no-op in fixed mode or when the
    /// limiter is disabled.
    pub async fn record_outcome(&self, source: &S, outcome: Outcome) {
        if !self.config.enabled {
            return;
        }
        let Some(adaptive) = &self.config.adaptive else {
            return;
        };

        let (group, base_interval) = self.key_fn.group_for(source, self.config.default_interval);
        let handle = self.group_handle(&group, base_interval, Instant::now());
        let mut state = handle.lock().await;
        state.last_activity = Instant::now();

        let previous = state.interval;

        match outcome {
            Outcome::RetryAfter(retry_after) if adaptive.respect_retry_after => {
                let capped = retry_after.min(RETRY_AFTER_CAP);
                state.interval = previous.max(capped).clamp(adaptive.min_interval, adaptive.max_interval);
                state.consecutive_successes = 0;
                self.emit_adapted(&group, previous, state.interval, AdaptReason::RetryAfterOverride);
            }
            Outcome::RetryAfter(_) | Outcome::Failure => {
                let scaled = previous.mul_f64(adaptive.increase_factor);
                state.interval = scaled.clamp(adaptive.min_interval, adaptive.max_interval);
                state.consecutive_successes = 0;
                self.emit_adapted(&group, previous, state.interval, AdaptReason::FailureIncrease);
            }
            Outcome::Success { latency } => {
                state.ewma_latency = Some(match state.ewma_latency {
                    None => latency,
                    Some(ewma) => {
                        let alpha = adaptive.ewma_alpha;
                        Duration::from_secs_f64(
                            alpha * latency.as_secs_f64() + (1.0 - alpha) * ewma.as_secs_f64(),
                        )
                    }
                });

                self.listeners.emit(&RateLimiterEvent::LatencyObserved {
                    group: group.clone(),
                    ewma: state.ewma_latency.unwrap_or_default(),
                    timestamp: std::time::Instant::now(),
                });

                state.consecutive_successes += 1;
                if state.consecutive_successes >= adaptive.success_threshold {
                    let decreased = previous.saturating_sub(adaptive.decrease_step);
                    state.interval = decreased.clamp(adaptive.min_interval, adaptive.max_interval);
                    state.consecutive_successes = 0;
                    self.emit_adapted(&group, previous, state.interval, AdaptReason::SuccessDecrease);
                }
            }
        }
    }

    fn emit_adapted(&self, group: &GroupKey, previous: Duration, current: Duration, reason: AdaptReason) {
        if previous == current {
            return;
        }
        self.listeners.emit(&RateLimiterEvent::IntervalAdapted {
            group: group.clone(),
            previous,
            current,
            reason,
            timestamp: std::time::Instant::now(),
        });
    }

    /// Removes groups whose `last_activity` is older than
    /// `config.cleanup_timeout`.
    pub fn evict_idle_groups(&self) {
        let timeout = self.config.cleanup_timeout;
        let now = Instant::now();
        let mut evicted = Vec::new();

        {
            let mut groups = self.groups.lock().expect("rate limiter group map poisoned");
            groups.retain(|key, state| {
                let last_activity = state
                    .try_lock()
                    .map(|guard| guard.last_activity)
                    .unwrap_or(now);
                let keep = now.saturating_duration_since(last_activity) < timeout;
                if !keep {
                    evicted.push(key.clone());
                }
                keep
            });
        }

        for group in evicted {
            self.listeners.emit(&RateLimiterEvent::GroupEvicted {
                group,
                timestamp: std::time::Instant::now(),
            });
        }
    }

    /// Spawns a background task that runs [`Self::evict_idle_groups`] on
    /// `config.cleanup_interval`, for as long as `self` (held via `Arc`)
    /// is alive.
    pub fn spawn_eviction_sweep(self: &Arc<Self>, spawner: &dyn Spawn) -> tokio::task::JoinHandle<()>
    where
        S: 'static,
    {
        let limiter = Arc::clone(self);
        let interval = self.config.cleanup_interval;
        spawner.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                limiter.evict_idle_groups();
            }
        })
    }
}
