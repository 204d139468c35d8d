use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{Airport, ApiHealthResult, Flight, NearbyAirports, PriceCalendarDay};

pub fn format_price(price: f64, currency: &str) -> String {
    let p = price.round() as i64;
    match currency {
        "USD" => format!("${p}"),
        "EUR" => format!("€{p}"),
        "GBP" => format!("£{p}"),
        "JPY" | "CNY" => format!("¥{p}"),
        "KRW" => format!("₩{p}"),
        "INR" => format!("₹{p}"),
        "THB" => format!("฿{p}"),
        _ => format!("{p} {currency}"),
    }
}

pub fn format_stops(flight: &Flight) -> String {
    match (flight.stops, &flight.layover) {
        (0, _) => "Nonstop".to_string(),
        (n, Some(layover)) => format!("{n} ({} {})", layover.airport, layover.duration),
        (n, None) => n.to_string(),
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn render_flights(flights: &[Flight], currency: &str) -> String {
    let mut table = new_table(vec![
        "Airline", "Flight", "Route", "Depart", "Arrive", "Duration", "Stops", "Price",
    ]);

    for flight in flights {
        let airline = if flight.best {
            format!("★ {}", flight.airline)
        } else {
            flight.airline.clone()
        };
        let route = format!("{} → {}", flight.departure_airport, flight.arrival_airport);
        let depart = match flight.departure_date {
            Some(ref date) => format!("{date} {}", flight.departure_time),
            None => flight.departure_time.clone(),
        };
        let number = flight.flight_number.clone().unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            airline,
            number,
            route,
            depart,
            flight.arrival_time.clone(),
            flight.duration.clone(),
            format_stops(flight),
            format_price(flight.price, currency),
        ]);
    }

    table.to_string()
}

pub fn render_airports(airports: &[Airport]) -> String {
    let mut table = new_table(vec!["Code", "Name", "City", "Country", "Sky ID", "Entity ID"]);
    for airport in airports {
        table.add_row(vec![
            airport.iata.clone().unwrap_or_else(|| "—".to_string()),
            airport.name.clone(),
            airport.city.clone(),
            airport.country.clone(),
            airport.sky_id.clone(),
            airport.entity_id.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_nearby(nearby: &NearbyAirports) -> String {
    let mut out = String::new();
    if let Some(ref current) = nearby.current {
        out.push_str(&format!(
            "Closest: {} ({})\n",
            current.name,
            current.iata.as_deref().unwrap_or(&current.sky_id)
        ));
    }
    out.push_str(&render_airports(&nearby.nearby));
    out
}

pub fn render_calendar(days: &[PriceCalendarDay], currency: &str) -> String {
    let mut table = new_table(vec!["Date", "Price", "Level"]);
    for day in days {
        table.add_row(vec![
            day.date.clone(),
            format_price(day.price, currency),
            day.group.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}

pub fn render_health(health: &ApiHealthResult) -> String {
    format!(
        "status: {}\nmock data: {}\napi key configured: {}\nchecked: {}\n{}",
        health.status,
        if health.using_mock_data { "yes" } else { "no" },
        if health.api_key_configured { "yes" } else { "no" },
        health.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        health.message
    )
}
