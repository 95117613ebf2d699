//! Backoff strategies for the retry middleware (specification §4.4).
//!
//! Ported from the teacher's `tower-retry-plus::backoff` module: the same
//! `IntervalFunction` seam, a `Fixed`/`Exponential` pair, plus `Linear`
//! (which the teacher does not have) and an exponential-with-jitter
//! variant whose jitter formula is the specification's own
//! (`d/2 + uniform(0, d/2)`), not the teacher's `randomization_factor`
//! band.

use std::time::Duration;

/// Computes the delay before the next retry attempt.
pub trait IntervalFunction: Send + Sync {
    /// `attempt` is the request's current attempt counter (0-indexed, so
    /// the first retry is computed for `attempt == 0`).
    fn next_interval(&self, attempt: u32) -> Duration;
}

/// Always waits the same duration, regardless of attempt.
#[derive(Debug, Clone)]
pub struct ConstantInterval {
    base_delay: Duration,
}

impl ConstantInterval {
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }
}

impl IntervalFunction for ConstantInterval {
    fn next_interval(&self, _attempt: u32) -> Duration {
        self.base_delay
    }
}

/// Grows linearly with the attempt number: `base_delay * attempt`.
#[derive(Debug, Clone)]
pub struct LinearInterval {
    base_delay: Duration,
}

impl LinearInterval {
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }
}

impl IntervalFunction for LinearInterval {
    fn next_interval(&self, attempt: u32) -> Duration {
        self.base_delay.mul_f64(attempt as f64)
    }
}

/// `min(base_delay * 2^attempt, max_delay)`.
#[derive(Debug, Clone)]
pub struct ExponentialInterval {
    base_delay: Duration,
    max_delay: Duration,
}

impl ExponentialInterval {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self { base_delay, max_delay }
    }
}

impl IntervalFunction for ExponentialInterval {
    fn next_interval(&self, attempt: u32) -> Duration {
        let grown = self.base_delay.mul_f64(2f64.powi(attempt as i32));
        grown.min(self.max_delay)
    }
}

/// `d = min(base_delay * 2^attempt, max_delay); delay = d/2 + uniform(0, d/2)`.
#[derive(Debug, Clone)]
pub struct ExponentialJitterInterval {
    base_delay: Duration,
    max_delay: Duration,
}

impl ExponentialJitterInterval {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self { base_delay, max_delay }
    }
}

impl IntervalFunction for ExponentialJitterInterval {
    fn next_interval(&self, attempt: u32) -> Duration {
        use rand::Rng;
        let grown = self.base_delay.mul_f64(2f64.powi(attempt as i32));
        let d = grown.min(self.max_delay);
        let half = d.mul_f64(0.5);
        let jitter = rand::thread_rng().gen_range(0.0..=half.as_secs_f64());
        half + Duration::from_secs_f64(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_attempt_invariant() {
        let backoff = ConstantInterval::new(Duration::from_secs(2));
        assert_eq!(backoff.next_interval(0), Duration::from_secs(2));
        assert_eq!(backoff.next_interval(5), Duration::from_secs(2));
    }

    #[test]
    fn linear_scales_with_attempt() {
        let backoff = LinearInterval::new(Duration::from_millis(100));
        assert_eq!(backoff.next_interval(0), Duration::from_millis(0));
        assert_eq!(backoff.next_interval(3), Duration::from_millis(300));
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let backoff = ExponentialInterval::new(Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(backoff.next_interval(0), Duration::from_millis(100));
        assert_eq!(backoff.next_interval(1), Duration::from_millis(200));
        assert_eq!(backoff.next_interval(2), Duration::from_millis(400));
        assert_eq!(backoff.next_interval(3), Duration::from_millis(500));
    }

    #[test]
    fn exponential_jitter_stays_within_half_range() {
        let backoff = ExponentialJitterInterval::new(Duration::from_millis(100), Duration::from_millis(1000));
        for _ in 0..20 {
            let delay = backoff.next_interval(2);
            // d = 400ms, so delay in [200ms, 400ms].
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(400));
        }
    }
}
