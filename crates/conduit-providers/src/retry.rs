//! Per-model retry policy, applied before the fallback chain advances to
//! the next candidate. Adapted from the runtime's retry module: fixed,
//! linear, and exponential-with-jitter backoff strategies.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    Fixed(Duration),
    Linear { base: Duration },
    Exponential { base: Duration, max: Duration },
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts against a single candidate before giving up on it,
    /// including the first. Default of 1 means "no retry" — behaviorally
    /// identical to a plain fallback chain.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::Fixed(Duration::from_millis(0)),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts.max(1),
            backoff: BackoffStrategy::Fixed(delay),
        }
    }

    pub fn exponential(attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts: attempts.max(1),
            backoff: BackoffStrategy::Exponential { base, max },
        }
    }

    /// Delay to sleep before attempt number `attempt` (1-indexed; attempt 1
    /// never sleeps).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(0);
        }
        match &self.backoff {
            BackoffStrategy::Fixed(d) => *d,
            BackoffStrategy::Linear { base } => *base * (attempt - 1),
            BackoffStrategy::Exponential { base, max } => {
                let exp = base.as_millis().saturating_mul(1u128 << (attempt - 2).min(16));
                let capped = exp.min(max.as_millis());
                let jitter_ms = rand::thread_rng().gen_range(0..=capped.max(1) / 4 + 1);
                Duration::from_millis((capped + jitter_ms) as u64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.delay_for(1), Duration::from_millis(0));
    }

    #[test]
    fn fixed_backoff_is_constant_after_first_attempt() {
        let p = RetryPolicy::fixed(3, Duration::from_millis(50));
        assert_eq!(p.delay_for(1), Duration::from_millis(0));
        assert_eq!(p.delay_for(2), Duration::from_millis(50));
        assert_eq!(p.delay_for(3), Duration::from_millis(50));
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let p = RetryPolicy::exponential(5, Duration::from_millis(10), Duration::from_millis(100));
        for attempt in 1..=5 {
            assert!(p.delay_for(attempt) <= Duration::from_millis(100 + 30));
        }
    }
}
