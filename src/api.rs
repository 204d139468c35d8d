use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::airport::{self, normalize_airport};
use crate::config::ApiConfig;
use crate::error::FlightError;
use crate::fallback::{with_fallback, with_mock_fallback};
use crate::fetch::{
    param, FetchOptions, HttpTransport, Query, Transport, FLIGHT_DETAILS_PATH,
    NEARBY_AIRPORTS_PATH, PRICE_CALENDAR_PATH, SEARCH_AIRPORT_PATH, SEARCH_FLIGHTS_PATH,
};
use crate::health::HealthProber;
use crate::mock;
use crate::model::{
    parse_date, Airport, ApiHealthResult, CabinClass, Flight, FlightLeg, FlightSearchParams,
    NearbyAirports, PriceCalendarDay, TripType,
};
use crate::normalize::{self, coerce_number, NormalizeContext};
use crate::retry::{with_retry, RetryPolicy};

const DEFAULT_LOCALE: &str = "en-US";

pub struct FlightService {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    health: HealthProber,
}

impl FlightService {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        let health = HealthProber::new(config.clone(), Arc::clone(&transport));
        Self {
            config,
            transport,
            retry: RetryPolicy::default(),
            health,
        }
    }

    pub fn with_http(config: ApiConfig, options: &FetchOptions) -> Result<Self, FlightError> {
        let transport = HttpTransport::new(config.clone(), options)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn health(&self) -> &HealthProber {
        &self.health
    }

    async fn get(&self, path: &str, query: Query, cancel: &CancellationToken) -> Result<Value, FlightError> {
        with_retry(&self.retry, cancel, || self.transport.get_json(path, &query)).await
    }

    pub async fn search_airport(&self, query: &str) -> Result<Vec<Airport>, FlightError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FlightError::Validation("airport search query is required".into()));
        }

        let cancel = CancellationToken::new();
        let airports = with_mock_fallback(
            &self.config,
            || async {
                let params = vec![param("query", query), param("locale", DEFAULT_LOCALE)];
                let response = self.get(SEARCH_AIRPORT_PATH, params, &cancel).await?;
                let airports: Vec<Airport> = airport::airport_records(&response)
                    .iter()
                    .map(normalize_airport)
                    .filter(|a| !a.sky_id.is_empty())
                    .collect();
                if airports.is_empty() {
                    return Err(FlightError::NoResults);
                }
                Ok(airports)
            },
            || async { airport::mock_search(query) },
            "searchAirport",
        )
        .await;
        Ok(airports)
    }

    pub async fn search_flights(
        &self,
        params: &FlightSearchParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<Flight>, FlightError> {
        params.validate()?;
        if cancel.is_cancelled() {
            return Err(FlightError::Cancelled);
        }

        let flights = with_mock_fallback(
            &self.config,
            || async {
                let response = self
                    .get(SEARCH_FLIGHTS_PATH, search_query(params), cancel)
                    .await?;
                let items = normalize::normalize_response_envelope(&response);
                if items.is_empty() {
                    return Err(FlightError::NoResults);
                }
                Ok(normalize::normalize_flights(&items, params))
            },
            || async {
                if cancel.is_cancelled() {
                    Vec::new()
                } else {
                    mock::mock_flights(params)
                }
            },
            "searchFlights",
        )
        .await;

        if cancel.is_cancelled() {
            return Err(FlightError::Cancelled);
        }
        Ok(flights)
    }

    pub async fn nearby_airports(&self, lat: f64, lng: f64) -> Result<NearbyAirports, FlightError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(FlightError::Validation(format!("invalid latitude: {lat}")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(FlightError::Validation(format!("invalid longitude: {lng}")));
        }

        let cancel = CancellationToken::new();
        let nearby = with_mock_fallback(
            &self.config,
            || async {
                let query = vec![
                    param("lat", lat.to_string()),
                    param("lng", lng.to_string()),
                    param("locale", DEFAULT_LOCALE),
                ];
                let response = self.get(NEARBY_AIRPORTS_PATH, query, &cancel).await?;
                let data = response.get("data").unwrap_or(&response);
                let current = data
                    .get("current")
                    .filter(|c| c.is_object())
                    .map(normalize_airport);
                let nearby: Vec<Airport> = data
                    .get("nearby")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(normalize_airport).collect())
                    .unwrap_or_default();
                if current.is_none() && nearby.is_empty() {
                    return Err(FlightError::NoResults);
                }
                Ok(NearbyAirports { current, nearby })
            },
            || async { mock::mock_nearby_airports(lat, lng) },
            "getNearByAirports",
        )
        .await;
        Ok(nearby)
    }

    pub async fn flight_details(
        &self,
        legs: &[FlightLeg],
        adults: u32,
        cabin_class: CabinClass,
        currency: &str,
    ) -> Result<Option<Flight>, FlightError> {
        if legs.is_empty() {
            return Err(FlightError::Validation("at least one flight leg required".into()));
        }
        for leg in legs {
            leg.validate()?;
        }

        let encoded = serde_json::to_string(legs)
            .map_err(|e| FlightError::Validation(format!("cannot encode legs: {e}")))?;
        let ctx = NormalizeContext {
            default_from: legs[0].origin.clone(),
            default_to: legs[0].destination.clone(),
            origin_sky_id: Some(legs[0].origin.clone()),
            destination_sky_id: Some(legs[0].destination.clone()),
            departure_date: Some(legs[0].date.clone()),
            return_date: legs.get(1).map(|l| l.date.clone()),
            cabin_class: Some(cabin_class.as_api_str().to_string()),
            ..Default::default()
        };

        let cancel = CancellationToken::new();
        let details = with_fallback(
            &self.config,
            || async {
                let query = vec![
                    param("legs", encoded),
                    param("adults", adults.max(1).to_string()),
                    param("currency", currency),
                    param("locale", DEFAULT_LOCALE),
                    param("market", DEFAULT_LOCALE),
                    param("cabinClass", cabin_class.as_api_str()),
                    param("countryCode", "US"),
                ];
                let response = self.get(FLIGHT_DETAILS_PATH, query, &cancel).await?;
                let data = response.get("data").unwrap_or(&response);
                let record = data.get("itinerary").unwrap_or(data);
                if !record.is_object() {
                    return Err(FlightError::InvalidResponse("no itinerary in response".into()));
                }
                Ok(normalize::normalize_flight(record, &ctx))
            },
            "getFlightDetails",
        )
        .await;
        Ok(details)
    }

    pub async fn price_calendar(
        &self,
        origin: &str,
        destination: &str,
        from_date: &str,
        currency: &str,
    ) -> Result<Vec<PriceCalendarDay>, FlightError> {
        for code in [origin, destination] {
            if code.trim().is_empty() {
                return Err(FlightError::InvalidAirport(code.to_string()));
            }
        }
        let start = parse_date(from_date)?;

        let cancel = CancellationToken::new();
        let days = with_mock_fallback(
            &self.config,
            || async {
                let query = vec![
                    param("originSkyId", origin.trim()),
                    param("destinationSkyId", destination.trim()),
                    param("fromDate", from_date),
                    param("currency", currency),
                ];
                let response = self.get(PRICE_CALENDAR_PATH, query, &cancel).await?;
                let days = calendar_days(&response);
                if days.is_empty() {
                    return Err(FlightError::NoResults);
                }
                Ok(days)
            },
            || async { mock::mock_price_calendar(origin, destination, start) },
            "getPriceCalendar",
        )
        .await;
        Ok(days)
    }

    pub async fn check_health(&self, skip_cache: bool) -> ApiHealthResult {
        self.health.check_health(skip_cache).await
    }
}

fn search_query(params: &FlightSearchParams) -> Query {
    let mut query = vec![
        param("originSkyId", params.origin_sky_id.trim()),
        param("destinationSkyId", params.destination_sky_id.trim()),
        param("originEntityId", params.origin_entity_id.trim()),
        param("destinationEntityId", params.destination_entity_id.trim()),
        param("date", params.departure.as_str()),
    ];
    if let (TripType::RoundTrip, Some(ret)) = (params.trip_type(), &params.return_date) {
        query.push(param("returnDate", ret.as_str()));
    }
    query.extend([
        param("adults", params.adults.to_string()),
        param("cabinClass", params.cabin_class.as_api_str()),
        param("sortBy", "best"),
        param("currency", params.currency.as_str()),
        param("market", params.market.as_str()),
        param("countryCode", params.country_code.as_str()),
    ]);
    query
}

fn calendar_days(response: &Value) -> Vec<PriceCalendarDay> {
    let items = response
        .as_array()
        .or_else(|| response.get("data").and_then(Value::as_array))
        .or_else(|| {
            response
                .get("data")
                .and_then(|d| d.get("flights"))
                .and_then(|f| f.get("days"))
                .and_then(Value::as_array)
        });

    items
        .map(|days| {
            days.iter()
                .filter_map(|day| {
                    let date = airport::first_str(day, &[&["date"], &["day"]])?;
                    let price = day.get("price").and_then(coerce_number)?.max(0.0);
                    Some(PriceCalendarDay {
                        date,
                        price,
                        group: airport::get_str(day, &["group"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
