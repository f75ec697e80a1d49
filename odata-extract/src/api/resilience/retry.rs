//! Bounded exponential-backoff retry
//!
//! The policy is driven purely by return values: each attempt reports either a
//! final result, a retryable condition, or a fatal error. No state is shared
//! between attempts, so one policy can serve many concurrent callers.

use log::{info, warn};
use std::future::Future;
use std::time::Duration;

/// Retry timing and attempt limits
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for a single wait
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Wait before the attempt following `failed_attempt` (1-based)
    ///
    /// Values that overflow or are not finite fall back to `max_delay`.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(failed_attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let delay = self.base_delay.as_secs_f64() * factor;

        match Duration::try_from_secs_f64(delay) {
            Ok(delay) if delay < self.max_delay => delay,
            _ => self.max_delay,
        }
    }
}

/// Outcome of a failed attempt as reported by the operation
#[derive(Debug)]
pub enum RetryableError<E> {
    /// The service answered with a transient server status
    Retryable { status: u16 },
    /// Anything else; returned to the caller without another attempt
    Fatal(E),
}

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryFailure<E> {
    Exhausted { attempts: u32, last_status: u16 },
    Fatal(E),
}

/// Executes an operation with bounded exponential backoff
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails fatally, or attempts run out
    ///
    /// The operation receives the 1-based attempt number. The calling task is
    /// suspended for the whole backoff sequence.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryFailure<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RetryableError<E>>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Call succeeded on attempt {}/{}", attempt, max_attempts);
                    }
                    return Ok(value);
                }
                Err(RetryableError::Fatal(e)) => return Err(RetryFailure::Fatal(e)),
                Err(RetryableError::Retryable { status }) => {
                    if attempt >= max_attempts {
                        return Err(RetryFailure::Exhausted {
                            attempts: attempt,
                            last_status: status,
                        });
                    }

                    let delay = self.config.delay_after(attempt);
                    warn!(
                        "Service responded with HTTP {} (attempt {}/{}), retrying in {:?}",
                        status, attempt, max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_delays_double_from_five_seconds() {
        let config = RetryConfig::default();

        assert_eq!(config.delay_after(1), Duration::from_secs(5));
        assert_eq!(config.delay_after(2), Duration::from_secs(10));
        assert_eq!(config.delay_after(3), Duration::from_secs(20));
        assert_eq!(config.delay_after(4), Duration::from_secs(40));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(12),
            ..RetryConfig::default()
        };

        assert_eq!(config.delay_after(3), Duration::from_secs(12));
        assert_eq!(config.delay_after(30), Duration::from_secs(12));
    }

    #[test]
    fn test_delay_survives_huge_multipliers() {
        let zero_base = RetryConfig {
            base_delay: Duration::ZERO,
            backoff_multiplier: 1e200,
            ..RetryConfig::default()
        };
        assert_eq!(zero_base.delay_after(3), Duration::ZERO);

        let huge = RetryConfig {
            backoff_multiplier: 1e200,
            ..RetryConfig::default()
        };
        assert_eq!(huge.delay_after(3), Duration::from_secs(300));
        assert_eq!(RetryConfig::default().delay_after(u32::MAX), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<&str, RetryFailure<()>> = policy
            .execute(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(RetryableError::Retryable { status: 502 })
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_last_status() {
        let policy = RetryPolicy::default();

        let result: Result<(), RetryFailure<()>> = policy
            .execute(|_| async { Err(RetryableError::Retryable { status: 504 }) })
            .await;

        match result {
            Err(RetryFailure::Exhausted {
                attempts,
                last_status,
            }) => {
                assert_eq!(attempts, 5);
                assert_eq!(last_status, 504);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), RetryFailure<&str>> = policy
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RetryableError::Fatal("connection reset")) }
            })
            .await;

        assert!(matches!(result, Err(RetryFailure::Fatal("connection reset"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_config_makes_one_attempt() {
        let policy = RetryPolicy::new(RetryConfig::no_retry());

        let result: Result<(), RetryFailure<()>> = policy
            .execute(|_| async { Err(RetryableError::Retryable { status: 500 }) })
            .await;

        assert!(matches!(
            result,
            Err(RetryFailure::Exhausted { attempts: 1, .. })
        ));
    }
}
