//! Retry policy with exponential backoff, cap, and jitter.

use std::time::Duration;

use rand::Rng;

/// Configuration for bounded backoff-and-retry.
///
/// The delay for attempt `n` (1-indexed) is
/// `min(base_delay * factor^(n-1) * uniform[1-jitter, 1+jitter], max_delay)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the second attempt, prior to jitter.
    pub base_delay: Duration,
    /// Multiplier applied per attempt.
    pub factor: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Jitter fraction; the delay is scaled by a uniform factor in
    /// `[1 - jitter, 1 + jitter]`. Zero disables jitter.
    pub jitter: f64,
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            factor: 1.5,
            max_delay: Duration::from_millis(15_000),
            jitter: 0.1,
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Policy used when polling for a freshly created order to become
    /// visible: shorter base delay, same bounded shape.
    pub fn for_existence_polling() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            factor: 1.5,
            max_delay: Duration::from_millis(5_000),
            jitter: 0.1,
            max_attempts: 5,
        }
    }

    /// Zero-delay variant of this policy, for tests that exercise retry
    /// counting without waiting out the backoff schedule.
    pub fn without_delays(mut self) -> Self {
        self.base_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self
    }

    /// Returns the backoff delay after the given attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let raw_ms = self.base_delay.as_millis() as f64 * self.factor.powi(exponent);

        let jittered_ms = if self.jitter > 0.0 {
            let scale = rand::rng().random_range(1.0 - self.jitter..=1.0 + self.jitter);
            raw_ms * scale
        } else {
            raw_ms
        };

        Duration::from_millis(jittered_ms.min(self.max_delay.as_millis() as f64) as u64)
    }

    /// Returns true if another attempt may be made after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_within_jitter_envelope() {
        let policy = RetryPolicy::default();

        for attempt in 1..=5 {
            let raw = 2000.0 * 1.5_f64.powi(attempt as i32 - 1);
            let floor = (raw * 0.9).min(15_000.0) as u64;
            let ceiling = (raw * 1.1).min(15_000.0) as u64;

            let delay = policy.delay_for_attempt(attempt).as_millis() as u64;
            assert!(
                delay >= floor && delay <= ceiling,
                "attempt {attempt}: {delay}ms outside [{floor}, {ceiling}]"
            );
        }
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::default();
        // 2000 * 1.5^9 is ~77s before the cap.
        assert!(policy.delay_for_attempt(10) <= Duration::from_millis(15_000));
    }

    #[test]
    fn expected_delays_are_non_decreasing() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };

        let mut last = Duration::ZERO;
        for attempt in 1..=8 {
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay >= last, "delay shrank at attempt {attempt}");
            last = delay;
        }
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(4));
        assert!(!policy.should_retry(5));
        assert!(!policy.should_retry(6));
    }

    #[test]
    fn without_delays_keeps_attempt_budget() {
        let policy = RetryPolicy::default().without_delays();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for_attempt(3), Duration::ZERO);
    }
}
