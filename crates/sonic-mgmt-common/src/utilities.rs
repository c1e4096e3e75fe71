//! Polling helpers.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Polls `condition` until it returns true or `timeout` elapses.
///
/// Waits `delay` before the first check and `interval` between checks.
/// Returns whether the condition was met.
///
/// # Example
///
/// ```ignore
/// let cleared = wait_until(
///     Duration::from_secs(30),
///     Duration::from_secs(1),
///     Duration::ZERO,
///     || async { mka_session_count(&host).await.unwrap_or(1) == 0 },
/// )
/// .await;
/// ```
pub async fn wait_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    delay: Duration,
    mut condition: F,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !delay.is_zero() {
        sleep(delay).await;
    }

    let deadline = Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(timeout_secs = timeout.as_secs(), "wait_until timed out");
            return false;
        }
        sleep(interval.min(deadline - now)).await;
    }
}
