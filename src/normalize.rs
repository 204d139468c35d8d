use chrono::Utc;
use serde_json::Value;

use crate::airport::{first_str, get_str};
use crate::model::{Baggage, Flight, FlightSearchParams, Layover};

#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    pub index: usize,
    pub default_from: String,
    pub default_to: String,
    pub origin_sky_id: Option<String>,
    pub destination_sky_id: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub cabin_class: Option<String>,
}

impl NormalizeContext {
    pub fn for_search(params: &FlightSearchParams, index: usize) -> Self {
        Self {
            index,
            default_from: params.origin_sky_id.clone(),
            default_to: params.destination_sky_id.clone(),
            origin_sky_id: Some(params.origin_sky_id.clone()),
            destination_sky_id: Some(params.destination_sky_id.clone()),
            departure_date: Some(params.departure.clone()),
            return_date: params.return_date.clone(),
            cabin_class: Some(params.cabin_class.as_api_str().to_string()),
        }
    }

    fn synthetic_id(&self) -> String {
        format!("flight-{}-{}", self.index, Utc::now().timestamp_millis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightShape {
    Itinerary,
    Flat,
}

impl FlightShape {
    pub const ORDER: [FlightShape; 2] = [FlightShape::Itinerary, FlightShape::Flat];

    pub fn extract(self, raw: &Value, ctx: &NormalizeContext) -> Option<Flight> {
        match self {
            Self::Itinerary => extract_itinerary(raw, ctx),
            Self::Flat => Some(extract_flat(raw, ctx)),
        }
    }
}

pub fn normalize_flight(raw: &Value, ctx: &NormalizeContext) -> Flight {
    FlightShape::ORDER
        .iter()
        .find_map(|shape| shape.extract(raw, ctx))
        .unwrap_or_else(|| extract_flat(raw, ctx))
}

pub fn normalize_flights(items: &[Value], params: &FlightSearchParams) -> Vec<Flight> {
    items
        .iter()
        .enumerate()
        .map(|(i, raw)| normalize_flight(raw, &NormalizeContext::for_search(params, i)))
        .collect()
}

pub fn normalize_response_envelope(response: &Value) -> Vec<Value> {
    if let Value::Array(items) = response {
        return items.clone();
    }

    let candidates: [&[&str]; 5] = [
        &["data"],
        &["data", "data"],
        &["data", "flights"],
        &["data", "itineraries"],
        &["itineraries"],
    ];
    candidates
        .iter()
        .find_map(|path| lookup(response, path).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

fn lookup<'a>(val: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(val, |cur, key| cur.get(*key))
}

pub fn coerce_number(val: &Value) -> Option<f64> {
    let number = match val {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        Value::Object(_) => val
            .get("raw")
            .or_else(|| val.get("amount"))
            .and_then(coerce_number),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn non_negative_price(raw: Option<f64>) -> f64 {
    raw.filter(|p| *p > 0.0).unwrap_or(0.0)
}

fn first_number(val: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| val.get(*k).and_then(coerce_number))
}

fn stop_count(val: &Value, keys: &[&str]) -> Option<u32> {
    first_number(val, keys).map(|n| n.max(0.0) as u32)
}

fn segments_stops(segments: Option<&Vec<Value>>) -> Option<u32> {
    segments.map(|s| s.len().saturating_sub(1) as u32)
}

fn best_flag(raw: &Value) -> bool {
    let flagged = ["best", "isBest"]
        .iter()
        .find_map(|k| raw.get(*k).and_then(Value::as_bool))
        .unwrap_or(false);
    let tagged = raw
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some("best")));
    flagged || tagged
}

pub fn clock_time(s: &str) -> Option<(u32, u32)> {
    let s = s.trim();
    let time = match s.split_once('T') {
        Some((_, t)) => t,
        None => s,
    };
    let lower = time.to_lowercase();
    let (h, rest) = lower.split_once(':')?;
    let mut hour: u32 = h.trim().parse().ok()?;
    let minute_digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let minute: u32 = minute_digits.parse().ok()?;

    if lower.ends_with("pm") && hour < 12 {
        hour += 12;
    } else if lower.ends_with("am") && hour == 12 {
        hour = 0;
    }

    if hour < 24 && minute < 60 {
        Some((hour, minute))
    } else {
        None
    }
}

fn display_time(s: &str) -> String {
    if s.contains('T') {
        if let Some((h, m)) = clock_time(s) {
            return format!("{h:02}:{m:02}");
        }
    }
    s.to_string()
}

fn date_part(s: &str) -> Option<String> {
    s.split_once('T').map(|(date, _)| date.to_string())
}

pub fn format_minutes(total: u32) -> String {
    format!("{}h {}m", total / 60, total % 60)
}

pub fn backfill_duration(departure: &str, arrival: &str) -> Option<String> {
    let (dh, dm) = clock_time(departure)?;
    let (ah, am) = clock_time(arrival)?;
    let dep = dh * 60 + dm;
    let mut arr = ah * 60 + am;
    if arr < dep {
        arr += 24 * 60;
    }
    Some(format_minutes(arr - dep))
}

fn extract_itinerary(raw: &Value, ctx: &NormalizeContext) -> Option<Flight> {
    let legs = raw.get("legs")?.as_array()?;
    let leg = legs.first()?;
    let segments = leg.get("segments").and_then(Value::as_array);

    let departure_raw = get_str(leg, &["departure"]).unwrap_or_default();
    let arrival_raw = get_str(leg, &["arrival"]).unwrap_or_default();

    let price = raw
        .get("price")
        .and_then(coerce_number)
        .or_else(|| get_str(raw, &["price", "formatted"]).and_then(|f| coerce_number(&Value::String(f))));

    let airline = leg
        .get("carriers")
        .and_then(|c| {
            ["marketing", "operating"].iter().find_map(|kind| {
                c.get(*kind)
                    .and_then(Value::as_array)
                    .and_then(|list| list.first())
                    .and_then(|carrier| get_str(carrier, &["name"]))
            })
        })
        .or_else(|| {
            segments
                .and_then(|s| s.first())
                .and_then(|s| get_str(s, &["marketingCarrier", "name"]))
        })
        .unwrap_or_default();

    let duration = first_number(leg, &["durationInMinutes", "duration"])
        .map(|m| format_minutes(m.max(0.0) as u32))
        .or_else(|| backfill_duration(&departure_raw, &arrival_raw))
        .unwrap_or_default();

    let stops = stop_count(leg, &["stopCount", "stops"])
        .or_else(|| segments_stops(segments))
        .unwrap_or(0);

    let flight_number = segments.and_then(|s| s.first()).and_then(|seg| {
        let number = get_str(seg, &["flightNumber"])?;
        Some(match get_str(seg, &["marketingCarrier", "alternateId"]) {
            Some(code) => format!("{code}{number}"),
            None => number,
        })
    });

    let layover = segments.filter(|s| s.len() >= 2).and_then(|s| {
        let airport = first_str(&s[0], &[&["destination", "displayCode"], &["destination", "name"]])?;
        let duration = backfill_duration(
            &get_str(&s[0], &["arrival"]).unwrap_or_default(),
            &get_str(&s[1], &["departure"]).unwrap_or_default(),
        )?;
        Some(Layover { airport, duration })
    });

    let return_date = legs
        .get(1)
        .and_then(|l| get_str(l, &["departure"]))
        .and_then(|d| date_part(&d))
        .or_else(|| ctx.return_date.clone());

    Some(Flight {
        id: first_str(raw, &[&["id"]])
            .or_else(|| get_str(leg, &["id"]))
            .unwrap_or_else(|| ctx.synthetic_id()),
        airline,
        departure_time: display_time(&departure_raw),
        arrival_time: display_time(&arrival_raw),
        departure_airport: first_str(leg, &[&["origin", "displayCode"], &["origin", "id"]])
            .unwrap_or_else(|| ctx.default_from.clone()),
        arrival_airport: first_str(leg, &[&["destination", "displayCode"], &["destination", "id"]])
            .unwrap_or_else(|| ctx.default_to.clone()),
        duration,
        stops,
        price: non_negative_price(price),
        best: best_flag(raw),
        aircraft: None,
        flight_number,
        cabin_class: ctx.cabin_class.clone(),
        baggage: None,
        layover,
        origin_sky_id: get_str(leg, &["origin", "id"]).or_else(|| ctx.origin_sky_id.clone()),
        destination_sky_id: get_str(leg, &["destination", "id"])
            .or_else(|| ctx.destination_sky_id.clone()),
        departure_date: date_part(&departure_raw).or_else(|| ctx.departure_date.clone()),
        return_date,
    })
}

fn extract_flat(raw: &Value, ctx: &NormalizeContext) -> Flight {
    let segments = raw.get("segments").and_then(Value::as_array);
    let first_segment = segments.and_then(|s| s.first());
    let last_segment = segments.and_then(|s| s.last());

    let departure_raw = first_str(raw, &[&["departureTime"], &["departure_time"], &["departure"]])
        .or_else(|| first_segment.and_then(|s| first_str(s, &[&["departureTime"], &["departure"]])))
        .unwrap_or_default();
    let arrival_raw = first_str(raw, &[&["arrivalTime"], &["arrival_time"], &["arrival"]])
        .or_else(|| last_segment.and_then(|s| first_str(s, &[&["arrivalTime"], &["arrival"]])))
        .unwrap_or_default();

    let duration = match raw.get("duration") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
    .or_else(|| {
        first_number(raw, &["duration", "durationInMinutes"]).map(|m| format_minutes(m.max(0.0) as u32))
    })
    .or_else(|| backfill_duration(&departure_raw, &arrival_raw))
    .unwrap_or_default();

    let stops = stop_count(raw, &["stops", "stopCount", "numberOfStops"])
        .or_else(|| segments_stops(segments))
        .unwrap_or(0);

    let baggage = raw.get("baggage").filter(|b| b.is_object()).map(|b| Baggage {
        carry_on: first_str(b, &[&["carryOn"], &["carry_on"]]),
        checked: get_str(b, &["checked"]),
    });

    let layover = raw.get("layover").and_then(|l| {
        Some(Layover {
            airport: get_str(l, &["airport"])?,
            duration: get_str(l, &["duration"]).unwrap_or_default(),
        })
    });

    Flight {
        id: first_str(raw, &[&["id"], &["legId"], &["itineraryId"]])
            .unwrap_or_else(|| ctx.synthetic_id()),
        airline: first_str(
            raw,
            &[&["airline"], &["carrier"], &["airlineName"], &["carrier", "name"]],
        )
        .or_else(|| first_segment.and_then(|s| first_str(s, &[&["airline"], &["carrier"]])))
        .unwrap_or_default(),
        departure_time: display_time(&departure_raw),
        arrival_time: display_time(&arrival_raw),
        departure_airport: first_str(
            raw,
            &[&["departureAirport"], &["from"], &["origin"], &["origin", "displayCode"]],
        )
        .unwrap_or_else(|| ctx.default_from.clone()),
        arrival_airport: first_str(
            raw,
            &[&["arrivalAirport"], &["to"], &["destination"], &["destination", "displayCode"]],
        )
        .unwrap_or_else(|| ctx.default_to.clone()),
        duration,
        stops,
        price: non_negative_price(first_number(raw, &["price", "amount", "total", "fare"])),
        best: best_flag(raw),
        aircraft: first_str(raw, &[&["aircraft"], &["aircraftType"]]),
        flight_number: first_str(raw, &[&["flightNumber"], &["flight_number"]]),
        cabin_class: first_str(raw, &[&["cabinClass"], &["cabin_class"]])
            .or_else(|| ctx.cabin_class.clone()),
        baggage,
        layover,
        origin_sky_id: get_str(raw, &["originSkyId"]).or_else(|| ctx.origin_sky_id.clone()),
        destination_sky_id: get_str(raw, &["destinationSkyId"])
            .or_else(|| ctx.destination_sky_id.clone()),
        departure_date: get_str(raw, &["departureDate"])
            .or_else(|| date_part(&departure_raw))
            .or_else(|| ctx.departure_date.clone()),
        return_date: get_str(raw, &["returnDate"]).or_else(|| ctx.return_date.clone()),
    }
}
