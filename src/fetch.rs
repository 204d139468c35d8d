use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use wreq::Client;

use crate::config::ApiConfig;
use crate::error::{self, FlightError};

pub const SEARCH_AIRPORT_PATH: &str = "/api/v1/flights/searchAirport";
pub const SEARCH_FLIGHTS_PATH: &str = "/api/v2/flights/searchFlights";
pub const NEARBY_AIRPORTS_PATH: &str = "/api/v1/flights/getNearByAirports";
pub const FLIGHT_DETAILS_PATH: &str = "/api/v1/flights/getFlightDetails";
pub const PRICE_CALENDAR_PATH: &str = "/api/v1/flights/getPriceCalendar";

pub type Query = Vec<(String, String)>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value, FlightError>;
}

#[derive(Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

pub struct HttpTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpTransport {
    pub fn new(config: ApiConfig, options: &FetchOptions) -> Result<Self, FlightError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value, FlightError> {
        if !self.config.is_configured() {
            return Err(FlightError::NotConfigured);
        }

        let url = format!("{}{path}", self.config.base_url());
        tracing::debug!(%url, params = query.len(), "GET");

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", self.config.api_key.trim())
            .header("x-rapidapi-host", self.config.api_host.trim())
            .query(query)
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        match status {
            429 => return Err(FlightError::RateLimited),
            _ if !(200..300).contains(&status) => return Err(FlightError::HttpStatus(status)),
            _ => {}
        }

        let body = response.text().await.map_err(error::from_http_error)?;
        serde_json::from_str(&body).map_err(|e| FlightError::InvalidResponse(e.to_string()))
    }
}

pub(crate) fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}
