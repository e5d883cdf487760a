//! Bounded retry combinator.
//!
//! Each attempt is an explicit `Result`; exhaustion returns the last
//! error instead of unwinding through an exception loop. Intermediate
//! failures are logged, not surfaced.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Run `op` up to `max_attempts` times, sleeping `delay` between
/// attempts. Returns the first success or the last error.
///
/// `max_attempts` is clamped to at least one attempt.
pub async fn retry_async<T, E, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = max_attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        if attempt > 1 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt, max_attempts = attempts, error = %e, "attempt failed");
                last_err = Some(e);
            }
        }
    }

    // attempts >= 1, so at least one error was recorded.
    Err(last_err.expect("retry ran zero attempts"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_async(3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_async(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("transient {n}"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_async(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {n}")) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_attempts_clamps_to_one() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_async(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
