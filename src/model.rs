use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FlightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Airport,
    City,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub sky_id: String,
    pub entity_id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub entity_type: Option<EntityType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baggage {
    pub carry_on: Option<String>,
    pub checked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layover {
    pub airport: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub duration: String,
    pub stops: u32,
    pub price: f64,
    #[serde(default)]
    pub best: bool,
    pub aircraft: Option<String>,
    pub flight_number: Option<String>,
    pub cabin_class: Option<String>,
    pub baggage: Option<Baggage>,
    pub layover: Option<Layover>,
    pub origin_sky_id: Option<String>,
    pub destination_sky_id: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "economy" => Ok(Self::Economy),
            "premium_economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(FlightError::Validation(format!("invalid cabin class: {s}"))),
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchParams {
    pub origin_sky_id: String,
    pub destination_sky_id: String,
    pub origin_entity_id: String,
    pub destination_entity_id: String,
    pub departure: String,
    pub return_date: Option<String>,
    pub adults: u32,
    pub cabin_class: CabinClass,
    pub currency: String,
    pub market: String,
    pub country_code: String,
    pub locale: String,
}

impl FlightSearchParams {
    pub fn one_way(
        origin: (&str, &str),
        destination: (&str, &str),
        departure: &str,
    ) -> Self {
        Self {
            origin_sky_id: origin.0.to_string(),
            origin_entity_id: origin.1.to_string(),
            destination_sky_id: destination.0.to_string(),
            destination_entity_id: destination.1.to_string(),
            departure: departure.to_string(),
            return_date: None,
            adults: 1,
            cabin_class: CabinClass::Economy,
            currency: "USD".into(),
            market: "en-US".into(),
            country_code: "US".into(),
            locale: "en-US".into(),
        }
    }

    pub fn trip_type(&self) -> TripType {
        if self.return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        }
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let required = [
            ("origin sky id", &self.origin_sky_id),
            ("destination sky id", &self.destination_sky_id),
            ("origin entity id", &self.origin_entity_id),
            ("destination entity id", &self.destination_entity_id),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(FlightError::Validation(format!("{label} is required")));
            }
        }

        let departure = parse_date(&self.departure)?;
        if let Some(ref ret) = self.return_date {
            if parse_date(ret)? < departure {
                return Err(FlightError::Validation(format!(
                    "return date {ret} is before departure date {}",
                    self.departure
                )));
            }
        }

        if self.adults == 0 {
            return Err(FlightError::Validation(
                "at least one passenger required".into(),
            ));
        }
        if self.adults > 9 {
            return Err(FlightError::Validation(format!(
                "adults ({}) exceeds maximum of 9",
                self.adults
            )));
        }

        Ok(())
    }
}

pub fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| FlightError::InvalidDate(date.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const DEFAULT: PriceRange = PriceRange {
        min: 0.0,
        max: 10_000.0,
    };

    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut bounds: Option<(f64, f64)> = None;
        for price in prices {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(price), hi.max(price)),
                None => (price, price),
            });
        }
        bounds.map(|(lo, hi)| Self {
            min: (lo / 100.0).floor() * 100.0,
            max: (hi / 100.0).ceil() * 100.0,
        })
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=23 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "night" => Ok(Self::Night),
            _ => Err(FlightError::Validation(format!("invalid time of day: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightFilters {
    pub price_range: PriceRange,
    pub stops: Vec<u32>,
    pub airlines: Vec<String>,
    pub departure_times: Vec<TimeOfDay>,
    pub arrival_times: Vec<TimeOfDay>,
    /// Maximum duration in minutes; 0 disables the filter.
    pub duration: u32,
}

impl Default for FlightFilters {
    fn default() -> Self {
        Self {
            price_range: PriceRange::DEFAULT,
            stops: Vec::new(),
            airlines: Vec::new(),
            departure_times: Vec::new(),
            arrival_times: Vec::new(),
            duration: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub price_range: Option<PriceRange>,
    pub stops: Option<Vec<u32>>,
    pub airlines: Option<Vec<String>>,
    pub departure_times: Option<Vec<TimeOfDay>>,
    pub arrival_times: Option<Vec<TimeOfDay>>,
    pub duration: Option<u32>,
}

impl FlightFilters {
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(range) = update.price_range {
            self.price_range = range;
        }
        if let Some(stops) = update.stops {
            self.stops = stops;
        }
        if let Some(airlines) = update.airlines {
            self.airlines = airlines;
        }
        if let Some(times) = update.departure_times {
            self.departure_times = times;
        }
        if let Some(times) = update.arrival_times {
            self.arrival_times = times;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Best,
    Cheapest,
    Fastest,
}

impl SortOption {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "cheapest" => Ok(Self::Cheapest),
            "fastest" => Ok(Self::Fastest),
            _ => Err(FlightError::Validation(format!("invalid sort option: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Online,
    Offline,
    Mock,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
            Self::Mock => f.write_str("mock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHealthResult {
    pub status: HealthStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub using_mock_data: bool,
    pub api_key_configured: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyAirports {
    pub current: Option<Airport>,
    pub nearby: Vec<Airport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCalendarDay {
    pub date: String,
    pub price: f64,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

impl FlightLeg {
    pub fn validate(&self) -> Result<(), FlightError> {
        if self.origin.trim().is_empty() {
            return Err(FlightError::Validation("leg origin is required".into()));
        }
        if self.destination.trim().is_empty() {
            return Err(FlightError::Validation(
                "leg destination is required".into(),
            ));
        }
        parse_date(&self.date)?;
        Ok(())
    }
}
