use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::airport::{self, haversine_km, MOCK_AIRPORTS};
use crate::model::{Baggage, Flight, FlightSearchParams, Layover, NearbyAirports, PriceCalendarDay};
use crate::normalize::format_minutes;

struct Route {
    from: &'static str,
    to: &'static str,
    price: f64,
    minutes: u32,
}

const ROUTES: &[Route] = &[
    Route { from: "JFK", to: "LAX", price: 329.0, minutes: 380 },
    Route { from: "JFK", to: "LHR", price: 612.0, minutes: 415 },
    Route { from: "JFK", to: "CDG", price: 588.0, minutes: 445 },
    Route { from: "JFK", to: "MIA", price: 189.0, minutes: 190 },
    Route { from: "JFK", to: "SFO", price: 359.0, minutes: 400 },
    Route { from: "LAX", to: "HND", price: 845.0, minutes: 705 },
    Route { from: "LAX", to: "SYD", price: 1120.0, minutes: 870 },
    Route { from: "LAX", to: "ORD", price: 249.0, minutes: 255 },
    Route { from: "ORD", to: "LHR", price: 655.0, minutes: 500 },
    Route { from: "LHR", to: "DXB", price: 489.0, minutes: 415 },
    Route { from: "LHR", to: "SIN", price: 799.0, minutes: 790 },
    Route { from: "LHR", to: "CDG", price: 119.0, minutes: 75 },
    Route { from: "CDG", to: "FRA", price: 139.0, minutes: 75 },
    Route { from: "AMS", to: "FRA", price: 129.0, minutes: 70 },
    Route { from: "DXB", to: "SIN", price: 415.0, minutes: 450 },
    Route { from: "SIN", to: "HKG", price: 229.0, minutes: 235 },
    Route { from: "HKG", to: "HND", price: 309.0, minutes: 245 },
    Route { from: "SFO", to: "HKG", price: 899.0, minutes: 850 },
];

const AIRLINES: &[(&str, &str)] = &[
    ("Delta", "DL"),
    ("United Airlines", "UA"),
    ("American Airlines", "AA"),
    ("British Airways", "BA"),
    ("Lufthansa", "LH"),
    ("Emirates", "EK"),
    ("Air France", "AF"),
    ("Singapore Airlines", "SQ"),
];

const AIRCRAFT: &[&str] = &["Boeing 737-800", "Airbus A321neo", "Boeing 787-9", "Airbus A350-900"];

const LAYOVER_HUBS: &[&str] = &["ORD", "FRA", "DXB", "AMS"];

const FLIGHTS_PER_ROUTE: usize = 8;

fn route_profile(from: &str, to: &str) -> (f64, u32) {
    ROUTES
        .iter()
        .find(|r| (r.from == from && r.to == to) || (r.from == to && r.to == from))
        .map(|r| (r.price, r.minutes))
        .unwrap_or_else(|| {
            let seed: u32 = from.bytes().chain(to.bytes()).map(u32::from).sum();
            (250.0 + f64::from(seed % 40) * 10.0, 180 + (seed % 12) * 30)
        })
}

fn route_code(sky_id: &str) -> String {
    airport::iata_from_sky_id(sky_id.trim()).unwrap_or_else(|| sky_id.trim().to_uppercase())
}

fn add_minutes(hour: u32, minute: u32, minutes: u32) -> (u32, u32) {
    let total = (hour * 60 + minute + minutes) % (24 * 60);
    (total / 60, total % 60)
}

pub fn mock_flights(params: &FlightSearchParams) -> Vec<Flight> {
    let from = route_code(&params.origin_sky_id);
    let to = route_code(&params.destination_sky_id);
    let (base_price, base_minutes) = route_profile(&from, &to);
    let cabin_factor = match params.cabin_class {
        crate::model::CabinClass::Economy => 1.0,
        crate::model::CabinClass::PremiumEconomy => 1.6,
        crate::model::CabinClass::Business => 3.2,
        crate::model::CabinClass::First => 5.0,
    };

    let mut flights: Vec<Flight> = (0..FLIGHTS_PER_ROUTE)
        .map(|i| {
            let (airline, code) = AIRLINES[i % AIRLINES.len()];
            let stops = if i % 3 == 2 { 1 } else { 0 };
            let minutes = base_minutes + stops * 95 + (i as u32 % 4) * 10;
            let dep_hour = (5 + i as u32 * 2) % 24;
            let dep_minute = (i as u32 * 25) % 60;
            let (arr_hour, arr_minute) = add_minutes(dep_hour, dep_minute, minutes);
            let price_factor = 0.82 + (i as f64 * 0.37) % 0.6 - f64::from(stops) * 0.08;
            let price = (base_price * price_factor * cabin_factor).round();

            Flight {
                id: format!("mock-{from}-{to}-{i}"),
                airline: airline.to_string(),
                departure_time: format!("{dep_hour:02}:{dep_minute:02}"),
                arrival_time: format!("{arr_hour:02}:{arr_minute:02}"),
                departure_airport: from.clone(),
                arrival_airport: to.clone(),
                duration: format_minutes(minutes),
                stops,
                price,
                best: false,
                aircraft: Some(AIRCRAFT[i % AIRCRAFT.len()].to_string()),
                flight_number: Some(format!("{code}{}", 100 + i * 37)),
                cabin_class: Some(params.cabin_class.as_api_str().to_string()),
                baggage: Some(Baggage {
                    carry_on: Some("1 x 7kg".into()),
                    checked: (i % 2 == 0).then(|| "1 x 23kg".to_string()),
                }),
                layover: (stops > 0).then(|| Layover {
                    airport: LAYOVER_HUBS[i % LAYOVER_HUBS.len()].to_string(),
                    duration: format_minutes(95),
                }),
                origin_sky_id: Some(params.origin_sky_id.clone()),
                destination_sky_id: Some(params.destination_sky_id.clone()),
                departure_date: Some(params.departure.clone()),
                return_date: params.return_date.clone(),
            }
        })
        .collect();

    if let Some(best) = flights
        .iter_mut()
        .filter(|f| f.stops == 0)
        .min_by(|a, b| a.price.total_cmp(&b.price))
    {
        best.best = true;
    }

    flights
}

pub fn mock_price_calendar(origin: &str, destination: &str, from_date: NaiveDate) -> Vec<PriceCalendarDay> {
    let (base_price, _) = route_profile(&route_code(origin), &route_code(destination));

    let days: Vec<(NaiveDate, f64)> = (0..30)
        .map(|offset| {
            let date = from_date + Duration::days(offset);
            let weekend = matches!(date.weekday(), Weekday::Fri | Weekday::Sat | Weekday::Sun);
            let wave = ((offset * 7) % 11) as f64 / 10.0;
            let factor = 0.8 + wave * 0.4 + if weekend { 0.15 } else { 0.0 };
            (date, (base_price * factor).round())
        })
        .collect();

    let low = days.iter().map(|(_, p)| *p).fold(f64::INFINITY, f64::min);
    let high = days.iter().map(|(_, p)| *p).fold(f64::NEG_INFINITY, f64::max);
    let third = (high - low) / 3.0;

    days.into_iter()
        .map(|(date, price)| {
            let group = if price <= low + third {
                "low"
            } else if price <= low + 2.0 * third {
                "medium"
            } else {
                "high"
            };
            PriceCalendarDay {
                date: date.format("%Y-%m-%d").to_string(),
                price,
                group: Some(group.to_string()),
            }
        })
        .collect()
}

const NEARBY_LIMIT: usize = 5;

pub fn mock_nearby_airports(lat: f64, lng: f64) -> NearbyAirports {
    let mut by_distance: Vec<(f64, &airport::MockAirport)> = MOCK_AIRPORTS
        .iter()
        .map(|a| (haversine_km(lat, lng, a.lat, a.lng), a))
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranked = by_distance.into_iter().map(|(_, a)| a.to_airport());
    let current = ranked.next();
    NearbyAirports {
        current,
        nearby: ranked.take(NEARBY_LIMIT).collect(),
    }
}
