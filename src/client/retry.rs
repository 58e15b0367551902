//! Retry combinator for transient request failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

// == Retry Policy ==
/// How many times to retry a transient failure, and how long to wait
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    /// Fixed pause before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

// == With Retry ==
/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's retries are used up.
///
/// Only failures for which [`RequestError::is_retryable`] holds are retried.
/// The error from the last attempt is returned unchanged.
///
/// [`RequestError::is_retryable`]: crate::error::RequestError::is_retryable
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut remaining = policy.retries;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if remaining > 0 && err.is_retryable() => {
                warn!(
                    "Retrying... ({}/{}) after: {}",
                    policy.retries - remaining + 1,
                    policy.retries,
                    err
                );
                remaining -= 1;
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
