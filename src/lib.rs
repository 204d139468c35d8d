pub mod airport;
pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod filter;
pub mod health;
pub mod logging;
pub mod mcp;
pub mod mock;
pub mod model;
pub mod normalize;
pub mod retry;
pub mod search;
pub mod table;

use std::sync::Arc;

use api::FlightService;
use config::ApiConfig;
use error::FlightError;
use fetch::FetchOptions;
use model::{Airport, FlightSearchParams};

pub fn service_from_env(options: &FetchOptions) -> Result<Arc<FlightService>, FlightError> {
    FlightService::with_http(ApiConfig::from_env(), options).map(Arc::new)
}

pub async fn resolve_airport(service: &FlightService, code: &str) -> Result<Airport, FlightError> {
    let code = code.trim();
    let candidates = service.search_airport(code).await?;
    candidates
        .iter()
        .find(|a| a.iata.as_deref().is_some_and(|i| i.eq_ignore_ascii_case(code)))
        .or_else(|| candidates.iter().find(|a| a.sky_id.eq_ignore_ascii_case(code)))
        .or_else(|| candidates.first())
        .cloned()
        .ok_or_else(|| FlightError::InvalidAirport(code.to_string()))
}

pub async fn resolve_search_params(
    service: &FlightService,
    mut params: FlightSearchParams,
) -> Result<FlightSearchParams, FlightError> {
    if params.origin_entity_id.trim().is_empty() {
        let origin = resolve_airport(service, &params.origin_sky_id).await?;
        params.origin_sky_id = origin.sky_id;
        params.origin_entity_id = origin.entity_id;
    }
    if params.destination_entity_id.trim().is_empty() {
        let destination = resolve_airport(service, &params.destination_sky_id).await?;
        params.destination_sky_id = destination.sky_id;
        params.destination_entity_id = destination.entity_id;
    }
    Ok(params)
}
