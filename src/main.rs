use std::process;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use skyscout::api::FlightService;
use skyscout::error::FlightError;
use skyscout::fetch::FetchOptions;
use skyscout::filter;
use skyscout::model::{
    CabinClass, FilterUpdate, FlightLeg, FlightSearchParams, PriceRange, SortOption, TimeOfDay,
};
use skyscout::search::SearchOrchestrator;
use skyscout::{logging, table};

#[derive(Parser)]
#[command(
    name = "skyscout",
    about = "Search flights, airports and fares from the terminal",
    version,
    after_help = "\
Examples:
  skyscout search -f JFK -t LHR -d 2026-04-01
  skyscout search -f LAX -t HND -d 2026-05-01 --return-date 2026-05-15 --sort cheapest
  skyscout search -f JFK -t LAX -d 2026-04-01 --stops 0 --depart morning --json
  skyscout airports \"London\"
  skyscout calendar -f JFK -t LHR -d 2026-04-01
  skyscout health

Set RAPIDAPI_KEY to query the live Sky Scrapper API; without it, sample data is shown."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(long, global = true, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(short, long, global = true, help = "Log requests, retries and fallbacks to stderr")]
    verbose: bool,

    #[arg(long, global = true, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, global = true, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search for flights",
        long_about = "Search for flights between two airports.\n\
            Codes are resolved to sky/entity ids through airport search unless both ids are given.\n\
            Results can be filtered and sorted client-side.",
        after_help = "\
Examples:
  One-way:      skyscout search -f JFK -t LHR -d 2026-04-01
  Round-trip:   skyscout search -f LAX -t HND -d 2026-05-01 --return-date 2026-05-15
  Nonstop:      skyscout search -f JFK -t LAX -d 2026-04-01 --stops 0
  Morning only: skyscout search -f JFK -t LAX -d 2026-04-01 --depart morning
  Cheapest 3:   skyscout search -f JFK -t LAX -d 2026-04-01 --sort cheapest --top 3"
    )]
    Search(SearchArgs),
    #[command(about = "Find airports by city, name or code")]
    Airports {
        #[arg(value_name = "QUERY", help = "City, airport name or code (e.g. London, LAX, \"Paris (CDG)\")")]
        query: String,
    },
    #[command(about = "List airports near a location")]
    Nearby {
        #[arg(long, allow_negative_numbers = true, value_name = "DEG", help = "Latitude")]
        lat: f64,
        #[arg(long, allow_negative_numbers = true, value_name = "DEG", help = "Longitude")]
        lng: f64,
    },
    #[command(about = "Show the cheapest fare per day for a route")]
    Calendar {
        #[arg(short, long, value_name = "IATA", help = "Origin airport code")]
        from: String,
        #[arg(short, long, value_name = "IATA", help = "Destination airport code")]
        to: String,
        #[arg(short, long, value_name = "YYYY-MM-DD", help = "First day of the calendar")]
        date: String,
        #[arg(long, default_value = "USD", value_name = "CODE", help = "Currency code")]
        currency: String,
    },
    #[command(about = "Look up the details of a specific itinerary")]
    Details {
        #[arg(
            long,
            required = true,
            value_name = "\"DATE FROM TO\"",
            help = "Flight leg (repeatable), e.g. \"2026-03-01 JFK LHR\""
        )]
        leg: Vec<String>,
        #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
        adults: u32,
        #[arg(long, default_value = "economy", value_name = "CLASS", help = "Cabin class [economy, premium-economy, business, first]")]
        cabin: String,
        #[arg(long, default_value = "USD", value_name = "CODE", help = "Currency code")]
        currency: String,
    },
    #[command(about = "Check whether the live flight API is reachable")]
    Health {
        #[arg(long, help = "Ignore the cached result and probe again")]
        refresh: bool,
    },
    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(short, long, value_name = "IATA", help = "Departure airport code or sky id")]
    from: String,

    #[arg(short, long, value_name = "IATA", help = "Arrival airport code or sky id")]
    to: String,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Departure date")]
    date: String,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Return date (makes the trip round-trip)")]
    return_date: Option<String>,

    #[arg(long, value_name = "ID", help = "Origin entity id (skips airport lookup)")]
    origin_entity_id: Option<String>,

    #[arg(long, value_name = "ID", help = "Destination entity id (skips airport lookup)")]
    destination_entity_id: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
    adults: u32,

    #[arg(
        long,
        default_value = "economy",
        value_name = "CLASS",
        help = "Cabin class [economy, premium-economy, business, first]"
    )]
    cabin: String,

    #[arg(long, default_value = "USD", value_name = "CODE", help = "Currency code (e.g. USD, EUR, JPY)")]
    currency: String,

    #[arg(long, default_value = "en-US", value_name = "CODE", help = "Market (e.g. en-US, en-GB)")]
    market: String,

    #[arg(long, default_value = "US", value_name = "CODE", help = "Country code (e.g. US, GB)")]
    country_code: String,

    #[arg(long, default_value = "en-US", value_name = "CODE", help = "Locale (e.g. en-US)")]
    locale: String,

    #[arg(long, default_value = "best", value_name = "ORDER", help = "Sort order [best, cheapest, fastest]")]
    sort: String,

    #[arg(long, value_name = "AMOUNT", help = "Minimum price")]
    min_price: Option<f64>,

    #[arg(long, value_name = "AMOUNT", help = "Maximum price")]
    max_price: Option<f64>,

    #[arg(long, value_name = "0,1,...", help = "Allowed stop counts (comma-separated)")]
    stops: Option<String>,

    #[arg(long, value_name = "NAME,...", help = "Allowed airlines (comma-separated names)")]
    airlines: Option<String>,

    #[arg(
        long,
        value_name = "WINDOW,...",
        help = "Departure windows [morning, afternoon, evening, night]"
    )]
    depart: Option<String>,

    #[arg(
        long,
        value_name = "WINDOW,...",
        help = "Arrival windows [morning, afternoon, evening, night]"
    )]
    arrive: Option<String>,

    #[arg(long, value_name = "MINUTES", help = "Maximum flight duration in minutes")]
    max_duration: Option<u32>,

    #[arg(long, value_name = "N", help = "Show only the first N results")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output")]
    compact: bool,
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::InvalidAirport(_) | FlightError::InvalidDate(_) | FlightError::Validation(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_)
        | FlightError::Cancelled => 3,
        FlightError::RateLimited => 4,
        FlightError::HttpStatus(_) | FlightError::NotConfigured => 5,
        FlightError::InvalidResponse(_) | FlightError::NoResults | FlightError::Other(_) => 6,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Validation(_) => "validation_error",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::Cancelled => "cancelled",
        FlightError::RateLimited => "rate_limited",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::NotConfigured => "not_configured",
        FlightError::InvalidResponse(_) => "parse_error",
        FlightError::Other(_) => "error",
        FlightError::NoResults => "no_results",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match output {
        Ok(s) => println!("{s}"),
        Err(e) => die(&FlightError::Other(e.to_string()), true),
    }
}

fn split_list(raw: &Option<String>) -> Option<Vec<String>> {
    raw.as_ref().map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

fn parse_stops(raw: &Option<String>) -> Result<Option<Vec<u32>>, FlightError> {
    split_list(raw)
        .map(|items| {
            items
                .iter()
                .map(|s| {
                    s.parse::<u32>()
                        .map_err(|_| FlightError::Validation(format!("invalid stop count: {s}")))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

fn parse_windows(raw: &Option<String>) -> Result<Option<Vec<TimeOfDay>>, FlightError> {
    split_list(raw)
        .map(|items| {
            items
                .iter()
                .map(|s| TimeOfDay::from_str_loose(s))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

fn build_filter_update(args: &SearchArgs, current: PriceRange) -> Result<FilterUpdate, FlightError> {
    let price_range = match (args.min_price, args.max_price) {
        (None, None) => None,
        (min, max) => Some(PriceRange {
            min: min.unwrap_or(current.min),
            max: max.unwrap_or(current.max),
        }),
    };
    Ok(FilterUpdate {
        price_range,
        stops: parse_stops(&args.stops)?,
        airlines: split_list(&args.airlines),
        departure_times: parse_windows(&args.depart)?,
        arrival_times: parse_windows(&args.arrive)?,
        duration: args.max_duration,
    })
}

fn build_params(args: &SearchArgs) -> Result<FlightSearchParams, FlightError> {
    Ok(FlightSearchParams {
        origin_sky_id: args.from.trim().to_uppercase(),
        destination_sky_id: args.to.trim().to_uppercase(),
        origin_entity_id: args.origin_entity_id.clone().unwrap_or_default(),
        destination_entity_id: args.destination_entity_id.clone().unwrap_or_default(),
        departure: args.date.clone(),
        return_date: args.return_date.clone(),
        adults: args.adults,
        cabin_class: CabinClass::from_str_loose(&args.cabin)?,
        currency: args.currency.to_uppercase(),
        market: args.market.clone(),
        country_code: args.country_code.to_uppercase(),
        locale: args.locale.clone(),
    })
}

fn print_compact(flights: &[skyscout::model::Flight], currency: &str) {
    for flight in flights {
        let best = if flight.best { " *best*" } else { "" };
        println!(
            "{} | {}>{} | {}>{} | {} | {} | {}{best}",
            table::format_price(flight.price, currency),
            flight.departure_airport,
            flight.arrival_airport,
            flight.departure_time,
            flight.arrival_time,
            flight.duration,
            table::format_stops(flight),
            flight.airline,
        );
    }
}

fn mock_notice(service: &FlightService, json_mode: bool) {
    if !json_mode && !service.config().is_configured() {
        eprintln!("note: RAPIDAPI_KEY is not set, showing sample data");
    }
}

async fn run_search(service: Arc<FlightService>, args: SearchArgs, json_mode: bool, pretty: bool) {
    let sort = SortOption::from_str_loose(&args.sort).unwrap_or_else(|e| die(&e, json_mode));
    let params = build_params(&args).unwrap_or_else(|e| die(&e, json_mode));

    // cheap checks first so a bad date fails before any airport lookup
    if let Err(e) = skyscout::model::parse_date(&params.departure) {
        die(&e, json_mode);
    }

    let params = skyscout::resolve_search_params(&service, params)
        .await
        .unwrap_or_else(|e| die(&e, json_mode));
    if let Err(e) = params.validate() {
        die(&e, json_mode);
    }

    let orchestrator = SearchOrchestrator::new(Arc::clone(&service));
    orchestrator.perform_search(params).await;

    let state = orchestrator.snapshot();
    if let Some(ref err) = state.error {
        die(&FlightError::Other(err.clone()), json_mode);
    }

    let update = build_filter_update(&args, state.filters.price_range)
        .unwrap_or_else(|e| die(&e, json_mode));
    orchestrator.set_filters(update);
    orchestrator.set_sort(sort);

    let mut flights = orchestrator.filtered_flights();
    if let Some(n) = args.top {
        flights.truncate(n);
    }

    if json_mode {
        print_json(&flights, pretty);
        return;
    }

    mock_notice(&service, json_mode);
    if flights.is_empty() {
        println!("No flights match the current filters.");
        return;
    }
    if args.compact {
        print_compact(&flights, &args.currency);
    } else {
        println!("{}", table::render_flights(&flights, &args.currency));
        println!("Airlines: {}", filter::airlines_in(&state.flights).join(", "));
    }
}

fn parse_leg(raw: &str) -> Result<FlightLeg, FlightError> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(FlightError::Validation(format!(
            "--leg must be \"DATE FROM TO\", got: \"{raw}\""
        )));
    }
    Ok(FlightLeg {
        date: parts[0].to_string(),
        origin: parts[1].to_uppercase(),
        destination: parts[2].to_uppercase(),
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json || cli.pretty;
    logging::initialize_logging(cli.verbose);

    let options = FetchOptions {
        proxy: cli.proxy.clone(),
        timeout: cli.timeout,
    };

    if let Commands::Mcp = cli.command {
        if let Err(e) = skyscout::mcp::run(options).await {
            eprintln!("error: MCP server failed: {e}");
            process::exit(1);
        }
        return;
    }

    let service = skyscout::service_from_env(&options).unwrap_or_else(|e| die(&e, json_mode));

    match cli.command {
        Commands::Search(args) => run_search(service, args, json_mode, cli.pretty).await,
        Commands::Airports { query } => {
            let airports = service
                .search_airport(&query)
                .await
                .unwrap_or_else(|e| die(&e, json_mode));
            if json_mode {
                print_json(&airports, cli.pretty);
            } else if airports.is_empty() {
                mock_notice(&service, json_mode);
                println!("No airports found.");
            } else {
                mock_notice(&service, json_mode);
                println!("{}", table::render_airports(&airports));
            }
        }
        Commands::Nearby { lat, lng } => {
            let nearby = service
                .nearby_airports(lat, lng)
                .await
                .unwrap_or_else(|e| die(&e, json_mode));
            if json_mode {
                print_json(&nearby, cli.pretty);
            } else {
                mock_notice(&service, json_mode);
                println!("{}", table::render_nearby(&nearby));
            }
        }
        Commands::Calendar {
            from,
            to,
            date,
            currency,
        } => {
            let days = service
                .price_calendar(&from.to_uppercase(), &to.to_uppercase(), &date, &currency)
                .await
                .unwrap_or_else(|e| die(&e, json_mode));
            if json_mode {
                print_json(&days, cli.pretty);
            } else {
                mock_notice(&service, json_mode);
                println!("{}", table::render_calendar(&days, &currency));
            }
        }
        Commands::Details {
            leg,
            adults,
            cabin,
            currency,
        } => {
            let legs: Vec<FlightLeg> = leg
                .iter()
                .map(|l| parse_leg(l))
                .collect::<Result<_, _>>()
                .unwrap_or_else(|e| die(&e, json_mode));
            let cabin = CabinClass::from_str_loose(&cabin).unwrap_or_else(|e| die(&e, json_mode));
            let details = service
                .flight_details(&legs, adults, cabin, &currency)
                .await
                .unwrap_or_else(|e| die(&e, json_mode));
            match details {
                Some(flight) if json_mode => print_json(&flight, cli.pretty),
                Some(flight) => println!("{}", table::render_flights(&[flight], &currency)),
                None if json_mode => print_json(&serde_json::Value::Null, cli.pretty),
                None => println!("No details available (the live API is required for itinerary details)."),
            }
        }
        Commands::Health { refresh } => {
            let health = service.check_health(refresh).await;
            if json_mode {
                print_json(&health, cli.pretty);
            } else {
                println!("{}", table::render_health(&health));
            }
        }
        Commands::Mcp => {}
    }
}
