use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::config::ApiConfig;
use crate::error::FlightError;
use crate::fetch::{param, Transport, SEARCH_AIRPORT_PATH};
use crate::model::{ApiHealthResult, HealthStatus};

pub const HEALTH_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const PROBE_QUERY: &str = "London";

struct CachedHealth {
    result: ApiHealthResult,
    checked_at: Instant,
}

pub struct HealthProber {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    ttl: Duration,
    cache: Mutex<Option<CachedHealth>>,
}

impl HealthProber {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            ttl: HEALTH_CACHE_TTL,
            cache: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn cached(&self) -> Option<ApiHealthResult> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .as_ref()
            .filter(|c| c.checked_at.elapsed() < self.ttl)
            .map(|c| c.result.clone())
    }

    fn store(&self, result: &ApiHealthResult) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedHealth {
            result: result.clone(),
            checked_at: Instant::now(),
        });
    }

    pub async fn check_health(&self, skip_cache: bool) -> ApiHealthResult {
        if !skip_cache {
            if let Some(cached) = self.cached() {
                return cached;
            }
        }

        if !self.config.is_configured() {
            let result = self.result(
                HealthStatus::Mock,
                true,
                "No API key configured, using mock data",
            );
            self.store(&result);
            return result;
        }

        let query = vec![param("query", PROBE_QUERY), param("locale", "en-US")];
        let outcome = tokio::time::timeout(
            PROBE_TIMEOUT,
            self.transport.get_json(SEARCH_AIRPORT_PATH, &query),
        )
        .await
        .unwrap_or(Err(FlightError::Timeout));

        let (result, cacheable) = match outcome {
            Ok(_) => (
                self.result(HealthStatus::Online, false, "Connected to the flight API"),
                true,
            ),
            Err(FlightError::RateLimited) => (
                self.result(
                    HealthStatus::Offline,
                    true,
                    "Rate limited by the flight API, using mock data",
                ),
                false,
            ),
            Err(FlightError::HttpStatus(status)) => (
                self.result(
                    HealthStatus::Online,
                    true,
                    &format!("Flight API responded with status {status}, using mock data"),
                ),
                true,
            ),
            Err(FlightError::InvalidResponse(_)) => (
                self.result(
                    HealthStatus::Online,
                    true,
                    "Flight API returned an unreadable response, using mock data",
                ),
                true,
            ),
            Err(err) => (
                self.result(
                    HealthStatus::Mock,
                    true,
                    &format!("Flight API unreachable ({err}), using mock data"),
                ),
                true,
            ),
        };

        tracing::info!(status = %result.status, using_mock_data = result.using_mock_data, "API health checked");
        if cacheable {
            self.store(&result);
        }
        result
    }

    fn result(&self, status: HealthStatus, using_mock_data: bool, message: &str) -> ApiHealthResult {
        ApiHealthResult {
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            using_mock_data,
            api_key_configured: self.config.is_configured(),
        }
    }
}
