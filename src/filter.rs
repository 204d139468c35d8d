use std::cmp::Ordering;

use crate::model::{Flight, FlightFilters, SortOption, TimeOfDay};
use crate::normalize::clock_time;

pub fn parse_duration_minutes(duration: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut digits = String::new();
    let mut seen_unit = false;

    for c in duration.trim().to_lowercase().chars() {
        match c {
            '0'..='9' => digits.push(c),
            'h' | 'm' => {
                let value: u32 = digits.parse().ok()?;
                let minutes = if c == 'h' { value.checked_mul(60)? } else { value };
                total = total.checked_add(minutes)?;
                digits.clear();
                seen_unit = true;
            }
            ' ' => {}
            _ => return None,
        }
    }

    if seen_unit && digits.is_empty() {
        Some(total)
    } else {
        None
    }
}

fn time_bucket(time: &str) -> Option<TimeOfDay> {
    clock_time(time).map(|(hour, _)| TimeOfDay::for_hour(hour))
}

fn in_buckets(time: &str, buckets: &[TimeOfDay]) -> bool {
    buckets.is_empty() || time_bucket(time).is_some_and(|b| buckets.contains(&b))
}

fn matches(flight: &Flight, filters: &FlightFilters) -> bool {
    if !filters.price_range.contains(flight.price) {
        return false;
    }
    if !filters.stops.is_empty() && !filters.stops.contains(&flight.stops) {
        return false;
    }
    if !filters.airlines.is_empty() && !filters.airlines.contains(&flight.airline) {
        return false;
    }
    if !in_buckets(&flight.departure_time, &filters.departure_times)
        || !in_buckets(&flight.arrival_time, &filters.arrival_times)
    {
        return false;
    }
    if filters.duration > 0 {
        return parse_duration_minutes(&flight.duration).is_some_and(|m| m <= filters.duration);
    }
    true
}

fn by_duration(a: &Flight, b: &Flight) -> Ordering {
    match (
        parse_duration_minutes(&a.duration),
        parse_duration_minutes(&b.duration),
    ) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_best(a: &Flight, b: &Flight) -> Ordering {
    b.best
        .cmp(&a.best)
        .then(a.stops.cmp(&b.stops))
        .then(a.price.total_cmp(&b.price))
}

pub fn apply_filters(flights: &[Flight], filters: &FlightFilters, sort: SortOption) -> Vec<Flight> {
    let mut view: Vec<Flight> = flights
        .iter()
        .filter(|f| matches(f, filters))
        .cloned()
        .collect();

    match sort {
        SortOption::Cheapest => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::Fastest => view.sort_by(by_duration),
        SortOption::Best => view.sort_by(by_best),
    }
    view
}

pub fn airlines_in(flights: &[Flight]) -> Vec<String> {
    let mut airlines: Vec<String> = flights.iter().map(|f| f.airline.clone()).collect();
    airlines.sort();
    airlines.dedup();
    airlines
}
