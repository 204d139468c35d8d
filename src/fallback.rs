use std::future::Future;

use crate::config::ApiConfig;
use crate::error::{self, FlightError};

/// Without a configured key `api_call` is never invoked.
pub async fn with_mock_fallback<T, A, AFut, M, MFut>(
    config: &ApiConfig,
    api_call: A,
    mock: M,
    context: &str,
) -> T
where
    A: FnOnce() -> AFut,
    AFut: Future<Output = Result<T, FlightError>>,
    M: FnOnce() -> MFut,
    MFut: Future<Output = T>,
{
    if !config.is_configured() {
        tracing::debug!(context, "no API key configured, using mock data");
        return mock().await;
    }

    match api_call().await {
        Ok(value) => value,
        Err(FlightError::Cancelled) => {
            tracing::debug!(context, "API call cancelled");
            mock().await
        }
        Err(err) => {
            tracing::warn!(
                context,
                error = %err,
                reason = %error::user_message(&err, None),
                "API call failed, falling back to mock data"
            );
            mock().await
        }
    }
}

pub async fn with_fallback<T, A, AFut>(config: &ApiConfig, api_call: A, context: &str) -> Option<T>
where
    A: FnOnce() -> AFut,
    AFut: Future<Output = Result<T, FlightError>>,
{
    if !config.is_configured() {
        tracing::debug!(context, "no API key configured, skipping lookup");
        return None;
    }

    match api_call().await {
        Ok(value) => Some(value),
        Err(FlightError::Cancelled) => {
            tracing::debug!(context, "API call cancelled");
            None
        }
        Err(err) => {
            tracing::warn!(context, error = %err, "API call failed, no fallback available");
            None
        }
    }
}
