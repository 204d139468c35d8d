use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::FlightService;
use crate::error::FlightError;
use crate::model::Airport;

pub const AUTOCOMPLETE_DELAY: Duration = Duration::from_millis(500);

pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// `None` if a newer call arrived during the quiet period, or `cancel` fired.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(self.delay) => {}
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            return None;
        }
        Some(f().await)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(AUTOCOMPLETE_DELAY)
    }
}

pub struct AirportAutocomplete {
    service: Arc<FlightService>,
    debouncer: Debouncer,
}

impl AirportAutocomplete {
    pub fn new(service: Arc<FlightService>) -> Self {
        Self::with_delay(service, AUTOCOMPLETE_DELAY)
    }

    pub fn with_delay(service: Arc<FlightService>, delay: Duration) -> Self {
        Self {
            service,
            debouncer: Debouncer::new(delay),
        }
    }

    pub async fn suggest(&self, query: &str, cancel: &CancellationToken) -> Option<Vec<Airport>> {
        let query = query.trim().to_string();
        let result = self
            .debouncer
            .run(cancel, || async {
                if query.is_empty() {
                    return Ok(Vec::new());
                }
                self.service.search_airport(&query).await
            })
            .await?;

        match result {
            Ok(airports) => Some(airports),
            Err(FlightError::Cancelled) => None,
            Err(err) => {
                tracing::debug!(error = %err, "airport suggestion rejected");
                Some(Vec::new())
            }
        }
    }
}
