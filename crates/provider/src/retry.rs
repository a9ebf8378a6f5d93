//! Retry policy for ITM API calls
//!
//! Every remote call made by a resource handler goes through the same fixed
//! exponential backoff: 1s initial interval, doubling, and a 20s budget on
//! total elapsed time. All errors are retried alike; the API does not give a
//! reliable way to tell a transient failure from a permanent one.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use citrixitm_common::{Error, Operation, Result};

/// Delay before the first retry
pub const INITIAL_INTERVAL: Duration = Duration::from_secs(1);

/// Growth factor between consecutive delays
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Total time after which no further attempt is started
pub const MAX_ELAPSED_TIME: Duration = Duration::from_secs(20);

/// Backoff configuration shared by all resource handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_elapsed_time: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: INITIAL_INTERVAL,
            multiplier: BACKOFF_MULTIPLIER,
            max_elapsed_time: MAX_ELAPSED_TIME,
        }
    }
}

/// Running backoff state for one retried call
#[derive(Debug)]
pub struct ExponentialBackoff {
    current_interval: Duration,
    multiplier: f64,
    max_elapsed_time: Duration,
    start_time: Instant,
}

impl ExponentialBackoff {
    /// Next delay, or None once the delay would overrun the elapsed-time budget.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        let next = self.current_interval;
        if self.start_time.elapsed() + next > self.max_elapsed_time {
            return None;
        }

        self.current_interval = Duration::from_secs_f64(next.as_secs_f64() * self.multiplier);
        Some(next)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl RetryPolicy {
    /// Start a fresh backoff clock
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            multiplier: self.multiplier,
            max_elapsed_time: self.max_elapsed_time,
            start_time: Instant::now(),
        }
    }

    /// Run `call` until it succeeds or the backoff budget is spent.
    ///
    /// On exhaustion the last error is returned inside [`Error::Remote`],
    /// tagged with the resource kind, operation and identifier.
    pub async fn run<T, F, Fut>(
        &self,
        kind: &'static str,
        operation: Operation,
        id: &str,
        mut call: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.backoff();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(kind, %operation, id, attempt, "Trying remote call");

            let err = match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            kind,
                            %operation,
                            id,
                            attempt,
                            elapsed = ?backoff.elapsed(),
                            "Remote call succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            match backoff.next_backoff() {
                Some(delay) => {
                    warn!(
                        kind,
                        %operation,
                        id,
                        attempt,
                        retry_after = ?delay,
                        error = %err,
                        "Remote call failed, will retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!(
                        kind,
                        %operation,
                        id,
                        attempt,
                        elapsed = ?backoff.elapsed(),
                        error = %err,
                        "Retry budget exhausted, giving up"
                    );
                    return Err(Error::Remote {
                        kind,
                        operation,
                        id: id.to_string(),
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
