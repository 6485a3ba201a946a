//! Bounded retry with linear backoff.
//!
//! A failed attempt `n` (1-based) is followed by a wait of `base_delay * n`
//! before attempt `n + 1`, so the default policy of 3 attempts and 1s base
//! delay waits 1s then 2s. Only failures whose [`Retryable::is_retryable`]
//! returns true are retried. The loop is per call and holds no shared state.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::{debug, warn};

pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn backoff(&self) -> LinearBackoff {
        LinearBackoff::new(self.max_attempts, self.base_delay)
    }
}

/// Per-request retry state. Each call to `next_backoff` records one failed
/// attempt and returns the wait before the next, or `None` once no attempts
/// remain.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base_delay: Duration,
    max_attempts: u32,
    failed_attempts: u32,
}

impl LinearBackoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            base_delay,
            max_attempts: max_attempts.max(1),
            failed_attempts: 0,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.failed_attempts = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if self.failed_attempts >= self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(self.failed_attempts))
    }
}

/// Successful result plus the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Final error of a retry sequence, annotated with attempts consumed.
#[derive(Debug, Clone)]
pub struct RetryExhausted<E> {
    pub error: E,
    pub attempts: u32,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} attempt(s))", self.error, self.attempts)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts. `operation` receives the 1-based attempt
/// number.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<Retried<T>, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + fmt::Display,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let error = match operation(attempt).await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt,
                })
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            debug!(attempt, error = %error, "Non-retryable failure");
            return Err(RetryExhausted {
                error,
                attempts: attempt,
            });
        }

        match backoff.next_backoff() {
            Some(delay) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retryable failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!(attempt, error = %error, "Retry attempts exhausted");
                return Err(RetryExhausted {
                    error,
                    attempts: attempt,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Debug)]
    struct TestError {
        retryable: bool,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error (retryable={})", self.retryable)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[test]
    fn test_linear_backoff_schedule() {
        let mut backoff = LinearBackoff::new(4, Duration::from_millis(1000));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(1000)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(2000)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(3000)));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_single_attempt_policy_never_waits() {
        let mut backoff = RetryPolicy::new(0, Duration::from_secs(1)).backoff();
        assert_eq!(backoff.next_backoff(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_use_every_attempt_with_linear_delays() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_for_op = Arc::clone(&calls);

        let result: Result<Retried<()>, _> = with_retry(&RetryPolicy::default(), |attempt| {
            let calls = Arc::clone(&calls_for_op);
            async move {
                calls.lock().unwrap().push((attempt, Instant::now()));
                Err(TestError { retryable: true })
            }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert!(exhausted.error.retryable);

        let calls = calls.lock().unwrap();
        let attempts: Vec<u32> = calls.iter().map(|(attempt, _)| *attempt).collect();
        assert_eq!(attempts, vec![1, 2, 3]);

        let first_gap = calls[1].1 - calls[0].1;
        let second_gap = calls[2].1 - calls[1].1;
        assert!(first_gap >= Duration::from_millis(1000));
        assert!(first_gap < Duration::from_millis(1100));
        assert!(second_gap >= Duration::from_millis(2000));
        assert!(second_gap < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_returns_immediately() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<Retried<()>, _> = with_retry(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: false }) }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_retrying_once_operation_succeeds() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::default(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(TestError { retryable: true })
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        let retried = result.unwrap();
        assert_eq!(retried.value, "recovered");
        assert_eq!(retried.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_then_fatal_stops_at_fatal() {
        let result: Result<Retried<()>, _> =
            with_retry(&RetryPolicy::new(5, Duration::from_millis(10)), |attempt| async move {
                Err(TestError {
                    retryable: attempt == 1,
                })
            })
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 2);
        assert!(!exhausted.error.retryable);
    }

    #[test]
    fn test_exhausted_display_mentions_attempts() {
        let exhausted = RetryExhausted {
            error: TestError { retryable: true },
            attempts: 3,
        };
        assert_eq!(
            exhausted.to_string(),
            "test error (retryable=true) (after 3 attempt(s))"
        );
    }
}
