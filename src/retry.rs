//! Retry policy for rate-limited requests
//!
//! The upstream rate-limits aggressively. A retryable status (429 by default)
//! is transient and recovered with a fixed delay; a fatal status (412 by
//! default) signals an IP-level block and must never be retried. Everything
//! else propagates on the first failure.
//!
//! # Example
//!
//! ```no_run
//! use repost_sweep::config::RetryConfig;
//! use repost_sweep::retry::with_retry;
//!
//! # async fn example() -> repost_sweep::Result<()> {
//! let config = RetryConfig::default();
//! let value = with_retry(&config, || async {
//!     // Your request here
//!     Ok::<_, repost_sweep::Error>(42)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use std::future::Future;

/// What the retry policy does with a failed attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Sleep and try again, consuming one attempt
    Retry,
    /// Stop immediately with [`Error::Blocked`]
    Fatal(u16),
    /// Return the error unchanged
    Propagate,
}

impl RetryConfig {
    /// Classify an error against this policy's status lists
    ///
    /// Fatal statuses win over retryable ones if a status appears in both.
    pub fn classify(&self, error: &Error) -> Disposition {
        match error.http_status() {
            Some(status) if self.fatal_statuses.contains(&status) => Disposition::Fatal(status),
            Some(status) if self.retry_statuses.contains(&status) => Disposition::Retry,
            _ => Disposition::Propagate,
        }
    }
}

/// Execute an async operation under the retry policy
///
/// # Arguments
///
/// * `config` - Retry policy (max attempts, delay, retryable and fatal statuses)
/// * `operation` - Async closure producing one attempt
///
/// # Errors
///
/// - [`Error::Blocked`] on a fatal status, without consuming retry budget
/// - [`Error::RetryExhausted`] when every attempt hit a retryable status
/// - the operation's own error for anything else
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Request succeeded after rate-limit retry");
                }
                return Ok(result);
            }
            Err(e) => match config.classify(&e) {
                Disposition::Retry if attempt < config.max_attempts => {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        max_attempts = config.max_attempts,
                        delay_ms = config.delay.as_millis(),
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(config.delay).await;
                }
                Disposition::Retry => {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Rate limited on every attempt, giving up"
                    );
                    return Err(Error::RetryExhausted { attempts: attempt });
                }
                Disposition::Fatal(status) => {
                    tracing::error!(
                        status = status,
                        "Requests blocked by upstream, change IP or retry later"
                    );
                    return Err(Error::Blocked { status });
                }
                Disposition::Propagate => {
                    tracing::debug!(error = %e, "Request failed with non-retryable error");
                    return Err(e);
                }
            },
        }
    }
}
