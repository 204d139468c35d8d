use skyscout::filter::{airlines_in, apply_filters, parse_duration_minutes};
use skyscout::model::{Flight, FlightFilters, PriceRange, SortOption, TimeOfDay};

fn flight(id: &str, airline: &str, depart: &str, duration: &str, stops: u32, price: f64) -> Flight {
    Flight {
        id: id.into(),
        airline: airline.into(),
        departure_time: depart.into(),
        arrival_time: "23:59".into(),
        departure_airport: "JFK".into(),
        arrival_airport: "LAX".into(),
        duration: duration.into(),
        stops,
        price,
        best: false,
        aircraft: None,
        flight_number: None,
        cabin_class: None,
        baggage: None,
        layover: None,
        origin_sky_id: None,
        destination_sky_id: None,
        departure_date: None,
        return_date: None,
    }
}

fn sample() -> Vec<Flight> {
    let mut best = flight("d", "Delta", "14:30", "6h 5m", 1, 510.0);
    best.best = true;
    vec![
        flight("a", "United Airlines", "06:00", "5h 30m", 0, 320.0),
        flight("b", "Delta", "19:45", "7h", 1, 210.0),
        flight("c", "JetBlue", "02:15", "unknown", 0, 280.0),
        best,
        flight("e", "United Airlines", "11:59", "45m", 2, 280.0),
    ]
}

fn ids(flights: &[Flight]) -> Vec<&str> {
    flights.iter().map(|f| f.id.as_str()).collect()
}

#[test]
fn duration_strings() {
    assert_eq!(parse_duration_minutes("5h 30m"), Some(330));
    assert_eq!(parse_duration_minutes("45m"), Some(45));
    assert_eq!(parse_duration_minutes("2h"), Some(120));
    assert_eq!(parse_duration_minutes("unknown"), None);
    assert_eq!(parse_duration_minutes(""), None);
    assert_eq!(parse_duration_minutes("5h 30"), None);
}

#[test]
fn default_filters_keep_everything() {
    let view = apply_filters(&sample(), &FlightFilters::default(), SortOption::Cheapest);
    assert_eq!(view.len(), 5);
}

#[test]
fn cheapest_sort_is_stable() {
    let view = apply_filters(&sample(), &FlightFilters::default(), SortOption::Cheapest);
    assert_eq!(ids(&view), ["b", "c", "e", "a", "d"]);
}

#[test]
fn fastest_puts_unparseable_last() {
    let view = apply_filters(&sample(), &FlightFilters::default(), SortOption::Fastest);
    assert_eq!(ids(&view), ["e", "a", "d", "b", "c"]);
}

#[test]
fn best_ranks_flag_then_stops_then_price() {
    let view = apply_filters(&sample(), &FlightFilters::default(), SortOption::Best);
    assert_eq!(ids(&view), ["d", "c", "a", "b", "e"]);
}

#[test]
fn filtering_is_idempotent() {
    let filters = FlightFilters {
        stops: vec![0, 1],
        price_range: PriceRange { min: 200.0, max: 400.0 },
        ..FlightFilters::default()
    };
    for sort in [SortOption::Best, SortOption::Cheapest, SortOption::Fastest] {
        let once = apply_filters(&sample(), &filters, sort);
        let twice = apply_filters(&once, &filters, sort);
        assert_eq!(once, twice);
    }
}

#[test]
fn price_range_is_inclusive() {
    let filters = FlightFilters {
        price_range: PriceRange { min: 210.0, max: 280.0 },
        ..FlightFilters::default()
    };
    let view = apply_filters(&sample(), &filters, SortOption::Cheapest);
    assert_eq!(ids(&view), ["b", "c", "e"]);
}

#[test]
fn airline_and_stop_sets() {
    let filters = FlightFilters {
        airlines: vec!["Delta".into()],
        stops: vec![1],
        ..FlightFilters::default()
    };
    let view = apply_filters(&sample(), &filters, SortOption::Cheapest);
    assert_eq!(ids(&view), ["b", "d"]);
}

#[test]
fn departure_buckets() {
    let morning = FlightFilters {
        departure_times: vec![TimeOfDay::Morning],
        ..FlightFilters::default()
    };
    assert_eq!(
        ids(&apply_filters(&sample(), &morning, SortOption::Cheapest)),
        ["e", "a"]
    );

    let night_or_evening = FlightFilters {
        departure_times: vec![TimeOfDay::Night, TimeOfDay::Evening],
        ..FlightFilters::default()
    };
    assert_eq!(
        ids(&apply_filters(&sample(), &night_or_evening, SortOption::Cheapest)),
        ["b", "c"]
    );
}

#[test]
fn bucket_boundaries() {
    assert_eq!(TimeOfDay::for_hour(5), TimeOfDay::Night);
    assert_eq!(TimeOfDay::for_hour(6), TimeOfDay::Morning);
    assert_eq!(TimeOfDay::for_hour(12), TimeOfDay::Afternoon);
    assert_eq!(TimeOfDay::for_hour(18), TimeOfDay::Evening);
    assert_eq!(TimeOfDay::for_hour(0), TimeOfDay::Night);
}

#[test]
fn unparseable_time_fails_active_bucket_filter() {
    let mut flights = sample();
    flights[0].departure_time = "TBD".into();
    let filters = FlightFilters {
        departure_times: vec![
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
        ],
        ..FlightFilters::default()
    };
    let view = apply_filters(&flights, &filters, SortOption::Cheapest);
    assert!(!ids(&view).contains(&"a"));
    assert_eq!(view.len(), 4);
}

#[test]
fn duration_threshold_excludes_unparseable() {
    let filters = FlightFilters {
        duration: 360,
        ..FlightFilters::default()
    };
    let view = apply_filters(&sample(), &filters, SortOption::Fastest);
    assert_eq!(ids(&view), ["e", "a"]);
}

#[test]
fn lists_distinct_airlines() {
    assert_eq!(airlines_in(&sample()), ["Delta", "JetBlue", "United Airlines"]);
}

#[test]
fn oversized_durations_are_unparseable() {
    assert_eq!(parse_duration_minutes("100000000h 0m"), None);
    assert_eq!(parse_duration_minutes("71582788h 59m"), None);
    assert_eq!(parse_duration_minutes("99999999999m"), None);
}

#[test]
fn oversized_duration_sorts_last_and_fails_threshold() {
    let mut flights = sample();
    flights[0].duration = "100000000h 0m".into();

    let fastest = apply_filters(&flights, &FlightFilters::default(), SortOption::Fastest);
    assert_eq!(ids(&fastest), ["e", "d", "b", "a", "c"]);

    let filters = FlightFilters {
        duration: u32::MAX,
        ..FlightFilters::default()
    };
    let view = apply_filters(&flights, &filters, SortOption::Cheapest);
    assert_eq!(ids(&view), ["b", "e", "d"]);
}
