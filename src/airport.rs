use serde_json::{json, Value};

use crate::model::{Airport, EntityType};

pub(crate) fn get_str(val: &Value, path: &[&str]) -> Option<String> {
    let mut cur = val;
    for key in path {
        cur = cur.get(*key)?;
    }
    match cur {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn first_str(val: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| get_str(val, path))
}

pub fn iata_from_sky_id(sky_id: &str) -> Option<String> {
    if sky_id.len() == 3 && sky_id.chars().all(|c| c.is_ascii_uppercase()) {
        Some(sky_id.to_string())
    } else {
        None
    }
}

fn parse_entity_type(raw: &str) -> Option<EntityType> {
    match raw.to_uppercase().as_str() {
        "AIRPORT" => Some(EntityType::Airport),
        "CITY" => Some(EntityType::City),
        _ => None,
    }
}

pub fn normalize_airport(raw: &Value) -> Airport {
    let sky_id = first_str(
        raw,
        &[
            &["skyId"],
            &["navigation", "relevantFlightParams", "skyId"],
            &["presentation", "skyId"],
        ],
    )
    .unwrap_or_default();

    let entity_id = first_str(
        raw,
        &[
            &["entityId"],
            &["navigation", "entityId"],
            &["navigation", "relevantFlightParams", "entityId"],
            &["presentation", "id"],
        ],
    )
    .unwrap_or_default();

    let name = first_str(
        raw,
        &[
            &["presentation", "title"],
            &["navigation", "localizedName"],
            &["name"],
        ],
    )
    .unwrap_or_default();

    let city = first_str(
        raw,
        &[
            &["navigation", "relevantFlightParams", "localizedName"],
            &["city"],
            &["presentation", "title"],
        ],
    )
    .unwrap_or_default();

    let country = first_str(raw, &[&["presentation", "subtitle"], &["country"]]).unwrap_or_default();

    let entity_type = first_str(
        raw,
        &[
            &["navigation", "entityType"],
            &["navigation", "relevantFlightParams", "flightPlaceType"],
            &["entityType"],
        ],
    )
    .and_then(|t| parse_entity_type(&t));

    Airport {
        iata: iata_from_sky_id(&sky_id),
        icao: get_str(raw, &["icao"]),
        sky_id,
        entity_id,
        name,
        city,
        country,
        entity_type,
    }
}

pub fn airport_records(response: &Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        _ => response
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

pub(crate) struct MockAirport {
    pub iata: &'static str,
    pub icao: &'static str,
    pub entity_id: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl MockAirport {
    pub fn to_airport(&self) -> Airport {
        Airport {
            iata: Some(self.iata.to_string()),
            icao: Some(self.icao.to_string()),
            sky_id: self.iata.to_string(),
            entity_id: self.entity_id.to_string(),
            name: self.name.to_string(),
            city: self.city.to_string(),
            country: self.country.to_string(),
            entity_type: Some(EntityType::Airport),
        }
    }
}

pub(crate) const MOCK_AIRPORTS: &[MockAirport] = &[
    MockAirport { iata: "JFK", icao: "KJFK", entity_id: "95565058", name: "John F. Kennedy International", city: "New York", country: "United States", lat: 40.6413, lng: -73.7781 },
    MockAirport { iata: "LAX", icao: "KLAX", entity_id: "95673635", name: "Los Angeles International", city: "Los Angeles", country: "United States", lat: 33.9416, lng: -118.4085 },
    MockAirport { iata: "ORD", icao: "KORD", entity_id: "95673374", name: "O'Hare International", city: "Chicago", country: "United States", lat: 41.9742, lng: -87.9073 },
    MockAirport { iata: "SFO", icao: "KSFO", entity_id: "95673577", name: "San Francisco International", city: "San Francisco", country: "United States", lat: 37.6213, lng: -122.3790 },
    MockAirport { iata: "MIA", icao: "KMIA", entity_id: "95673656", name: "Miami International", city: "Miami", country: "United States", lat: 25.7959, lng: -80.2870 },
    MockAirport { iata: "LHR", icao: "EGLL", entity_id: "95565050", name: "London Heathrow", city: "London", country: "United Kingdom", lat: 51.4700, lng: -0.4543 },
    MockAirport { iata: "CDG", icao: "LFPG", entity_id: "95565041", name: "Paris Charles de Gaulle", city: "Paris", country: "France", lat: 49.0097, lng: 2.5479 },
    MockAirport { iata: "FRA", icao: "EDDF", entity_id: "95565070", name: "Frankfurt am Main", city: "Frankfurt", country: "Germany", lat: 50.0379, lng: 8.5622 },
    MockAirport { iata: "AMS", icao: "EHAM", entity_id: "95565044", name: "Amsterdam Schiphol", city: "Amsterdam", country: "Netherlands", lat: 52.3105, lng: 4.7683 },
    MockAirport { iata: "DXB", icao: "OMDB", entity_id: "95673506", name: "Dubai International", city: "Dubai", country: "United Arab Emirates", lat: 25.2532, lng: 55.3657 },
    MockAirport { iata: "SIN", icao: "WSSS", entity_id: "95673375", name: "Singapore Changi", city: "Singapore", country: "Singapore", lat: 1.3644, lng: 103.9915 },
    MockAirport { iata: "HND", icao: "RJTT", entity_id: "128667143", name: "Tokyo Haneda", city: "Tokyo", country: "Japan", lat: 35.5494, lng: 139.7798 },
    MockAirport { iata: "HKG", icao: "VHHH", entity_id: "95673433", name: "Hong Kong International", city: "Hong Kong", country: "Hong Kong", lat: 22.3080, lng: 113.9185 },
    MockAirport { iata: "SYD", icao: "YSSY", entity_id: "95673519", name: "Sydney Kingsford Smith", city: "Sydney", country: "Australia", lat: -33.9399, lng: 151.1753 },
];

pub fn mock_airports() -> Vec<Airport> {
    MOCK_AIRPORTS.iter().map(MockAirport::to_airport).collect()
}

pub fn find_mock_airport(code: &str) -> Option<Airport> {
    MOCK_AIRPORTS
        .iter()
        .find(|a| a.iata.eq_ignore_ascii_case(code.trim()))
        .map(MockAirport::to_airport)
}

pub fn mock_record(airport: &Airport) -> Value {
    let entity_type = match airport.entity_type {
        Some(EntityType::City) => "CITY",
        _ => "AIRPORT",
    };
    let suggestion = match airport.iata {
        Some(ref code) => format!("{} ({code})", airport.name),
        None => airport.name.clone(),
    };
    json!({
        "skyId": airport.sky_id,
        "entityId": airport.entity_id,
        "icao": airport.icao,
        "presentation": {
            "title": airport.name,
            "suggestionTitle": suggestion,
            "subtitle": airport.country,
        },
        "navigation": {
            "entityId": airport.entity_id,
            "entityType": entity_type,
            "localizedName": airport.name,
            "relevantFlightParams": {
                "skyId": airport.sky_id,
                "entityId": airport.entity_id,
                "flightPlaceType": entity_type,
                "localizedName": airport.city,
            }
        }
    })
}

fn bracketed_code(query: &str) -> Option<String> {
    let open = query.rfind('(')?;
    let close = query[open..].find(')')? + open;
    let code = query[open + 1..close].trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_uppercase())
    } else {
        None
    }
}

fn match_rank(airport: &MockAirport, raw: &str, query: &str, code: Option<&str>) -> Option<u8> {
    let city = airport.city.to_lowercase();
    let name = airport.name.to_lowercase();
    let iata = airport.iata.to_lowercase();
    let country = airport.country.to_lowercase();

    let rules = [
        code.is_some_and(|c| c.eq_ignore_ascii_case(airport.iata)),
        city.contains(query),
        raw.contains(&city),
        name.contains(query),
        query.contains(&iata),
        country.contains(query),
    ];
    rules.iter().position(|&hit| hit).map(|i| i as u8)
}

pub fn mock_search(query: &str) -> Vec<Airport> {
    let raw = query.trim().to_lowercase();
    let code = bracketed_code(query);
    let stripped = match raw.find('(') {
        Some(idx) => raw[..idx].trim().to_string(),
        None => raw.clone(),
    };
    if stripped.is_empty() && code.is_none() {
        return Vec::new();
    }

    let mut ranked: Vec<(u8, &MockAirport)> = MOCK_AIRPORTS
        .iter()
        .filter_map(|a| {
            let rank = if stripped.is_empty() {
                code.as_deref()
                    .filter(|c| c.eq_ignore_ascii_case(a.iata))
                    .map(|_| 0)
            } else {
                match_rank(a, &raw, &stripped, code.as_deref())
            };
            rank.map(|r| (r, a))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, a)| a.to_airport()).collect()
}

pub(crate) fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
