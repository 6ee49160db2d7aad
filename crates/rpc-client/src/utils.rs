use std::{future::Future, time::Duration};

use anyhow::{anyhow, Result};
use tokio::time::{sleep, Instant};

pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Poll `f` every `interval` until it yields a value or `timeout` elapses.
pub(crate) async fn poll_until<T, F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start_time = Instant::now();
    loop {
        if let Some(value) = f().await? {
            return Ok(value);
        }
        if start_time.elapsed() >= timeout {
            return Err(anyhow!("Timeout: {:?} waiting for {}", timeout, what));
        }
        log::debug!(
            "waiting for {} for {} secs.",
            what,
            start_time.elapsed().as_secs()
        );
        sleep(interval).await;
    }
}
