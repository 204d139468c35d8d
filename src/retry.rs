use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{self, FlightError, DEFAULT_RETRYABLE_STATUSES};

const MAX_JITTER: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let factor = 2f64.powi(attempt.min(31) as i32) * (1.0 + jitter.clamp(0.0, MAX_JITTER));
        let millis = self.base_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_with_jitter(attempt, rand::random::<f64>() * MAX_JITTER)
    }
}

pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, FlightError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FlightError>>,
{
    let mut attempt = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(FlightError::Cancelled);
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(FlightError::Cancelled),
            result = operation() => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempt >= policy.max_retries || !error::is_retryable(&err, &policy.retryable_statuses) {
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        tracing::debug!(
            attempt = attempt + 1,
            max_retries = policy.max_retries,
            ?delay,
            error = %err,
            "retrying after failure"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(FlightError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}
