//! Bounded retry with randomized exponential backoff.
//!
//! The wait before attempt `n + 1` is drawn uniformly from `[0, min(max_delay, base_delay * 2^(n-1))]`,
//! so a policy with a 1s base and a 10s cap waits at most 1s, 2s, 4s, 8s, 10s, ... between attempts.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Classifies an error as transient (worth another attempt) or permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Configuration for a bounded retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Multiplier of the exponential backoff
    pub base_delay: Duration,
    /// Cap on the backoff ceiling
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_secs(1), max_delay: Duration::from_secs(10) }
    }
}

/// Terminal outcome of a retry loop that did not succeed
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was classified as permanent, no further attempt was made
    Permanent { attempt: u32, source: E },
    /// Every allowed attempt failed with a retryable error
    Exhausted { attempts: u32, source: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, RetryError::Permanent { .. })
    }

    /// The error returned by the last attempt
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Permanent { source, .. } | RetryError::Exhausted { source, .. } => source,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent { source, .. } | RetryError::Exhausted { source, .. } => source,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Permanent { attempt, source } => {
                write!(f, "permanent failure on attempt {}: {}", attempt, source)
            }
            RetryError::Exhausted { attempts, source } => {
                write!(f, "gave up after {} attempts: {}", attempts, source)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.last_error())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay, max_delay }
    }

    /// Upper bound of the wait that follows the failed attempt number `attempt` (1-based)
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(2_u32.saturating_pow(exponent)).min(self.max_delay)
    }

    /// Randomized wait that follows the failed attempt number `attempt`
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        if ceiling.is_zero() {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..=ceiling.as_secs_f64()))
    }

    /// Runs `call` until it succeeds, fails permanently, or the attempt budget is spent.
    ///
    /// Every failed attempt is logged with its attempt number; only the final outcome is
    /// returned to the caller. `call` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match call(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                warn!(operation, attempt, error = %error, "Permanent failure, not retrying");
                return Err(RetryError::Permanent { attempt, source: error });
            }

            warn!(operation, attempt, max_attempts = self.max_attempts, error = %error, "Attempt failed");
            if attempt >= self.max_attempts {
                return Err(RetryError::Exhausted { attempts: attempt, source: error });
            }

            tokio::time::sleep(self.next_delay(attempt)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError(bool);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error (retryable: {})", self.0)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_ceiling_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let ceilings: Vec<u64> = (1..=6).map(|n| policy.backoff_ceiling(n).as_secs()).collect();
        assert_eq!(ceilings, vec![1, 2, 4, 8, 10, 10]);
        // Large attempt numbers must not overflow
        assert_eq!(policy.backoff_ceiling(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_next_delay_stays_under_ceiling() {
        let policy = RetryPolicy::default();
        for attempt in 1..=8 {
            for _ in 0..50 {
                assert!(policy.next_delay(attempt) <= policy.backoff_ceiling(attempt));
            }
        }
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.next_delay(3), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_exhausts_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run("always_fails", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError(true)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let err = result.unwrap_err();
        assert!(!err.is_permanent());
        assert_eq!(err.attempts(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run("rejected", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError(false)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.unwrap_err().is_permanent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let result = RetryPolicy::default()
            .run("flaky", |attempt| async move {
                if attempt < 3 {
                    Err(TestError(true))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }
}
