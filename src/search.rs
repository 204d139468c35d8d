use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::FlightService;
use crate::error;
use crate::filter;
use crate::model::{FilterUpdate, Flight, FlightFilters, FlightSearchParams, PriceRange, SortOption};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub search_params: Option<FlightSearchParams>,
    pub flights: Vec<Flight>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub filters: FlightFilters,
    pub sort: SortOption,
}

pub struct SearchOrchestrator {
    service: Arc<FlightService>,
    state: Mutex<SearchState>,
    generation: AtomicU64,
    inflight: Mutex<Option<CancellationToken>>,
}

impl SearchOrchestrator {
    pub fn new(service: Arc<FlightService>) -> Self {
        Self {
            service,
            state: Mutex::new(SearchState::default()),
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SearchState {
        self.state().clone()
    }

    /// Returns whether this call's results were committed.
    pub async fn perform_search(&self, params: FlightSearchParams) -> bool {
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.state();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = self
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .replace(token.clone())
            {
                previous.cancel();
            }
            state.is_loading = true;
            state.error = None;
            state.search_params = Some(params.clone());
            generation
        };

        let outcome = self.service.search_flights(&params, &token).await;

        // The generation only advances while the state lock is held.
        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded search");
            return false;
        }
        match outcome {
            Ok(flights) => {
                state.filters.price_range =
                    PriceRange::from_prices(flights.iter().map(|f| f.price)).unwrap_or(PriceRange::DEFAULT);
                state.flights = flights;
            }
            Err(err) => {
                state.error = Some(error::user_message(&err, None));
                state.flights.clear();
            }
        }
        state.is_loading = false;
        true
    }

    pub fn set_filters(&self, update: FilterUpdate) {
        self.state().filters.merge(update);
    }

    pub fn clear_filters(&self) {
        let mut state = self.state();
        let price_range = PriceRange::from_prices(state.flights.iter().map(|f| f.price))
            .unwrap_or(PriceRange::DEFAULT);
        state.filters = FlightFilters {
            price_range,
            ..FlightFilters::default()
        };
    }

    pub fn set_sort(&self, sort: SortOption) {
        self.state().sort = sort;
    }

    pub fn filtered_flights(&self) -> Vec<Flight> {
        let state = self.state();
        filter::apply_filters(&state.flights, &state.filters, state.sort)
    }
}
