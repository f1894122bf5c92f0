//! Exponential backoff with jitter, honoring server-indicated retry hints
//! (§4.7). Decode/parse errors never retry — the caller only reaches for
//! this around the transport call, not around parsing.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::GdeltError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// Retries `attempt` up to `policy.max_retries` additional times. `attempt`
/// is called with the zero-based attempt number. Stops immediately on a
/// non-retryable error.
pub async fn retry_with_backoff<F, Fut, T>(policy: RetryPolicy, mut attempt: F) -> Result<T, GdeltError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GdeltError>>,
{
    let mut attempt_num = 0;
    loop {
        match attempt(attempt_num).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt_num >= policy.max_retries {
                    return Err(err);
                }
                let delay = backoff_delay(&policy, attempt_num, &err);
                warn!(attempt_num, error = %err, delay_ms = delay.as_millis() as u64, "retrying after backoff");
                tokio::time::sleep(delay).await;
                attempt_num += 1;
            }
        }
    }
}

fn backoff_delay(policy: &RetryPolicy, attempt_num: u32, err: &GdeltError) -> Duration {
    if let GdeltError::RateLimited {
        retry_after_ms: Some(ms),
    } = err
    {
        return Duration::from_millis(*ms);
    }
    let exponent = 2u64.saturating_pow(attempt_num);
    let base_ms = policy.base_delay.as_millis() as u64 * exponent;
    let jitter_ms = rand::thread_rng().gen_range(0..=base_ms.max(1) / 4 + 1);
    Duration::from_millis(base_ms + jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(RetryPolicy::new(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, GdeltError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_up_to_max_retries() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let result: Result<u32, GdeltError> = retry_with_backoff(policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GdeltError::Unavailable("boom".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, GdeltError> = retry_with_backoff(RetryPolicy::new(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GdeltError::Validation("bad filter".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rate_limited_retry_hint_is_honored_verbatim() {
        let policy = RetryPolicy::new(3);
        let err = GdeltError::RateLimited {
            retry_after_ms: Some(60_000),
        };
        assert_eq!(backoff_delay(&policy, 0, &err), Duration::from_millis(60_000));
    }
}
