use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use futures::Future;
use serde::Deserialize;
use tracing::warn;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded constant-delay retry, `attempts` counts the first try.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    pub attempts: usize,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

pub async fn retry<T, Fut, FutureFn, E>(policy: RetryPolicy, fut: FutureFn) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    FutureFn: FnMut() -> Fut,
    E: IsRetryable + std::fmt::Debug,
{
    fut.retry(
        ConstantBuilder::default()
            .with_delay(policy.delay)
            .with_max_times(policy.attempts.saturating_sub(1)),
    )
    .when(|e| e.is_retryable())
    .notify(|e, delay| warn!("retrying in {delay:?} after error: {e:?}"))
    .await
}
