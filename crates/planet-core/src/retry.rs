// ── Bounded retry ──

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::CoreError;

/// Fixed-delay retry with a cap on attempts.
///
/// Only credential rotation uses this: the switch briefly refuses
/// connections right after its login credentials change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds, fails with an error `retryable` rejects,
    /// or attempts run out. The last error is returned as-is.
    pub async fn run<T, F, Fut>(
        &self,
        mut op: F,
        retryable: impl Fn(&CoreError) -> bool,
    ) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && retryable(&e) => {
                    debug!(attempt, max_attempts, error = %e, "retrying after delay");
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn refused() -> CoreError {
        CoreError::ConnectionFailed {
            device: "lab".into(),
            endpoint: "/cgi-bin/save.cgi".into(),
            code: Some(111),
            message: "connection refused".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_connection_failures_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = tokio::time::Instant::now();

        let result = RetryPolicy::default()
            .run(
                move || async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(refused())
                    } else {
                        Ok(true)
                    }
                },
                CoreError::is_connection,
            )
            .await;

        assert!(matches!(result, Ok(true)));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_return_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(refused())
                },
                CoreError::is_connection,
            )
            .await;

        assert!(matches!(result, Err(CoreError::ConnectionFailed { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(CoreError::Protocol {
                        status: 500,
                        message: "boom".into(),
                    })
                },
                CoreError::is_connection,
            )
            .await;

        assert!(matches!(result, Err(CoreError::Protocol { status: 500, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
