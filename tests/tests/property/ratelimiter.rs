//! Property tests for the per-group rate limiter.
//!
//! Invariants tested:
//! - `acquire` never returns in less than the group's current interval
//!   after a prior dispatch to the same group.
//! - A run of consecutive failures never pushes a group's interval past
//!   `max_interval`.
//! - A `Retry-After` override is always capped at `RETRY_AFTER_CAP`.

use std::time::Duration;

use loomcrawl_ratelimiter::{AdaptiveConfig, GroupSource, Outcome, RateLimiter, RateLimiterConfigBuilder};
use proptest::prelude::*;
use tokio::runtime::Builder;

struct Source(&'static str);

impl GroupSource for Source {
    fn url(&self) -> &str {
        self.0
    }
}

fn paused_runtime() -> tokio::runtime::Runtime {
    Builder::new_current_thread().enable_all().start_paused(true).build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: in fixed mode, consecutive acquires for the same group
    /// are always paced at least `interval` apart.
    #[test]
    fn fixed_mode_never_paces_below_its_interval(
        interval_ms in 1u64..=500,
        acquires in 2usize..=6,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let interval = Duration::from_millis(interval_ms);
            let config = RateLimiterConfigBuilder::new().default_interval(interval).fixed_mode().build();
            let limiter = RateLimiter::new(config);
            let source = Source("https://fixed.example.com/x");

            let start = tokio::time::Instant::now();
            for _ in 0..acquires {
                limiter.acquire(&source).await;
            }
            let elapsed = start.elapsed();

            prop_assert!(
                elapsed >= interval * (acquires as u32 - 1),
                "elapsed {:?} was less than {} * {}",
                elapsed,
                interval_ms,
                acquires - 1
            );

            Ok(())
        })?;
    }

    /// Property: a run of N consecutive failures can never push the
    /// interval past `max_interval`, regardless of `increase_factor`.
    #[test]
    fn failures_never_exceed_max_interval(
        increase_factor in 1.0f64..10.0,
        failure_count in 1u32..20,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let adaptive = AdaptiveConfig {
                min_interval: Duration::from_millis(1),
                max_interval: Duration::from_millis(200),
                increase_factor,
                ..AdaptiveConfig::default()
            };
            let config = RateLimiterConfigBuilder::new()
                .default_interval(Duration::from_millis(10))
                .adaptive(adaptive)
                .build();
            let limiter = RateLimiter::new(config);
            let source = Source("https://failing.example.com/x");

            for _ in 0..failure_count {
                limiter.acquire(&source).await;
                limiter.record_outcome(&source, Outcome::Failure).await;
            }

            // There is no public interval accessor; a fresh `acquire` call
            // waits no longer than the current interval, so bound it by
            // observing the elapsed time of one more acquire.
            let start = tokio::time::Instant::now();
            limiter.acquire(&source).await;
            let waited = start.elapsed();

            prop_assert!(waited <= Duration::from_millis(200));

            Ok(())
        })?;
    }

    /// Property: a `Retry-After` override, however large, never pushes
    /// the observable wait past the 600s cap (bounded here by an
    /// intentionally generous `max_interval` so the cap — not the
    /// adaptive ceiling — is what's under test).
    #[test]
    fn retry_after_is_always_capped(
        retry_after_secs in 0u64..100_000,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let adaptive = AdaptiveConfig {
                max_interval: Duration::from_secs(100_000),
                ..AdaptiveConfig::default()
            };
            let config = RateLimiterConfigBuilder::new()
                .default_interval(Duration::from_millis(10))
                .adaptive(adaptive)
                .build();
            let limiter = RateLimiter::new(config);
            let source = Source("https://retry-after.example.com/x");

            limiter.acquire(&source).await;
            limiter.record_outcome(&source, Outcome::RetryAfter(Duration::from_secs(retry_after_secs))).await;

            // Advance past whatever interval resulted and time the next
            // acquire; it must never exceed the 600s cap, even though
            // `retry_after_secs` may be far larger.
            tokio::time::advance(Duration::from_secs(600)).await;
            let start = tokio::time::Instant::now();
            limiter.acquire(&source).await;
            let waited = start.elapsed();

            prop_assert!(waited <= Duration::from_secs(600), "waited {:?} exceeded the 600s cap", waited);

            Ok(())
        })?;
    }

    /// Property: independent groups never pace each other — acquiring
    /// for one group's key is unaffected by another group's interval.
    #[test]
    fn groups_are_independently_paced(
        interval_ms in 50u64..=300,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let config = RateLimiterConfigBuilder::new()
                .default_interval(Duration::from_millis(interval_ms))
                .fixed_mode()
                .build();
            let limiter = RateLimiter::new(config);
            let paced = Source("https://paced.example.com/a");
            let other = Source("https://other.example.com/b");

            limiter.acquire(&paced).await;
            limiter.acquire(&paced).await; // pays the full interval

            let start = tokio::time::Instant::now();
            limiter.acquire(&other).await; // first sight of a new group, no wait
            let waited = start.elapsed();

            prop_assert!(waited < Duration::from_millis(interval_ms));

            Ok(())
        })?;
    }
}
