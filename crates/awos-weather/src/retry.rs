//! Bounded retry for transient upstream failures.
//!
//! Retries timeouts, connection errors, and 5xx responses. Client errors
//! (4xx) and body/request construction errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::Response;

const MAX_DELAY_MS: u64 = 2000;

/// Retry policy for a single HTTP operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt
    pub attempts: u32,
    /// Delay before the first retry (doubles each attempt, capped)
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(MAX_DELAY_MS))
    }

    /// Run `op`, retrying transient failures. The final attempt's outcome
    /// is returned unmodified, so a persistent 5xx surfaces as a response
    /// for the caller's status handling.
    pub async fn run<F, Fut>(&self, op: F) -> Result<Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        for attempt in 0..self.attempts {
            match op().await {
                Ok(response) if response.status().is_server_error() => {
                    tracing::debug!(
                        status = %response.status(),
                        attempt,
                        "server error, retrying"
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_timeout() || e.is_connect() => {
                    tracing::debug!(error = %e, attempt, "transient error, retrying");
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.delay(attempt)).await;
        }
        op().await
    }
}
