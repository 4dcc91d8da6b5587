/*!
 * Retry executor with bounded exponential backoff and jitter.
 *
 * Wraps one batch-translate call. Every error kind is treated uniformly:
 * permanent provider errors burn through the same attempts as transient ones
 * before the last error surfaces unchanged.
 */

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::warn;
use rand::Rng;

use crate::app_config::RetryPolicy;

use super::LogCallback;

/// Initial backoff delay in seconds, multiplied by the policy factor after
/// each failed attempt
const INITIAL_DELAY_SECS: f64 = 1.0;

/// Run `action` up to `policy.max_attempts` times.
///
/// On failure the reason is logged, then the executor sleeps
/// `delay + uniform(0, jitter)` seconds before the next attempt, with the
/// delay growing by `backoff_factor`. Once attempts are exhausted the last
/// error is propagated unchanged so provider-specific diagnostics survive.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    log_cb: Option<&LogCallback>,
    mut action: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    let mut delay = INITIAL_DELAY_SECS;

    loop {
        attempt += 1;
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let message = format!("Translation attempt {} failed: {}", attempt, e);
                warn!("{}", message);
                if let Some(log) = log_cb {
                    log(&message);
                }

                if attempt >= policy.max_attempts {
                    return Err(e);
                }

                let jitter = if policy.backoff_jitter > 0.0 {
                    rand::rng().random_range(0.0..policy.backoff_jitter)
                } else {
                    0.0
                };
                tokio::time::sleep(Duration::from_secs_f64(delay + jitter)).await;
                delay *= policy.backoff_factor;
            }
        }
    }
}
