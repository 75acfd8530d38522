use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How often a failed request is re-attempted.
///
/// Requests are attempted once by default; retries only happen when the
/// configuration opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of retry attempts (total runs = 1 initial + retries)
    #[serde(default)]
    pub retries: usize,
    /// Milliseconds between attempts
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            retries: 0,
            delay_ms: default_delay_ms(),
        }
    }

    pub fn new(retries: usize, delay_ms: u64) -> Self {
        RetryPolicy { retries, delay_ms }
    }

    /// Runs `operation` until it succeeds or the policy is exhausted,
    /// returning the last error in the latter case.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(val) => return Ok(val),
                Err(err) => {
                    if attempt > self.retries {
                        return Err(err);
                    }
                    debug!(
                        "Attempt {}/{} failed: {}. Retrying...",
                        attempt, self.retries, err
                    );
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
                }
            }
        }
    }
}
