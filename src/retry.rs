//! Retry policy for completion calls
//!
//! The state machine is attempt → evaluate → backoff → retry | terminate.
//! [`RetryPolicy::decide`] holds the evaluate step as a pure function so it
//! can be tested without a transport; the loop itself lives in
//! [`crate::client::CompletionClient`].
//!
//! Backoff before attempt `k` (k ≥ 1) is `base_delay_ms * 2^(k-1)`, with no
//! jitter. Arithmetic saturates instead of overflowing.

use crate::config::ServiceConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
}

/// Outcome of evaluating a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given delay, then make another attempt
    Retry { delay: Duration },
    /// The error is terminal
    GiveUp,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.max_retries(), config.retry_delay_base_ms())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Upper bound on attempts for one call
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after the failed attempt with zero-based `attempt_index`
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        let factor = 2_u64.checked_pow(attempt_index).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Decide what to do after attempt `attempt_index` failed with `error`
    pub fn decide(&self, attempt_index: u32, error: &TransportError) -> RetryDecision {
        if error.is_retryable() && attempt_index < self.max_retries {
            RetryDecision::Retry {
                delay: self.backoff(attempt_index),
            }
        } else {
            RetryDecision::GiveUp
        }
    }
}

/// Source of backoff delays
///
/// Injected into the client so tests can observe delays without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays on the Tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            message: "error".to_string(),
            code: None,
        }
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        let policy = RetryPolicy::new(5, 1000);
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.backoff(3), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(10, u64::MAX / 2);
        assert_eq!(policy.backoff(4), Duration::from_millis(u64::MAX));
        assert_eq!(policy.backoff(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_retries_until_budget_exhausted() {
        let policy = RetryPolicy::new(2, 100);
        assert_eq!(
            policy.decide(0, &status(500)),
            RetryDecision::Retry {
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(
            policy.decide(1, &status(429)),
            RetryDecision::Retry {
                delay: Duration::from_millis(200)
            }
        );
        assert_eq!(policy.decide(2, &status(500)), RetryDecision::GiveUp);
    }

    #[test]
    fn test_zero_retries_gives_up_immediately() {
        let policy = RetryPolicy::new(0, 100);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.decide(0, &status(503)), RetryDecision::GiveUp);
    }

    #[test]
    fn test_timeout_is_never_retried() {
        let policy = RetryPolicy::new(3, 100);
        let timeout = TransportError::Timeout { timeout_seconds: 1 };
        assert_eq!(policy.decide(0, &timeout), RetryDecision::GiveUp);
    }

    #[test]
    fn test_network_errors_are_retried() {
        let policy = RetryPolicy::new(1, 50);
        let err = TransportError::Network {
            reason: "connection reset".to_string(),
        };
        assert!(matches!(policy.decide(0, &err), RetryDecision::Retry { .. }));
    }

    proptest! {
        #[test]
        fn prop_backoff_before_attempt_k_matches_formula(base in 0u64..10_000, k in 1u32..12) {
            let policy = RetryPolicy::new(12, base);
            prop_assert_eq!(
                policy.backoff(k - 1),
                Duration::from_millis(base * 2u64.pow(k - 1))
            );
        }

        #[test]
        fn prop_retry_count_never_exceeds_budget(max_retries in 0u32..10) {
            let policy = RetryPolicy::new(max_retries, 1);
            let retries = (0..=max_retries + 5)
                .take_while(|i| matches!(policy.decide(*i, &status(500)), RetryDecision::Retry { .. }))
                .count() as u32;
            prop_assert_eq!(retries, max_retries);
        }
    }
}
