use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::{Deserialize, Serialize};

use crate::api::FlightService;
use crate::fetch::FetchOptions;
use crate::model::{CabinClass, FilterUpdate, FlightSearchParams, PriceRange, SortOption};
use crate::search::SearchOrchestrator;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchFlightsArgs {
    #[schemars(description = "Departure airport IATA code or sky id. Example: JFK, LHR, LOND")]
    from: String,
    #[schemars(description = "Arrival airport IATA code or sky id. Example: LAX, CDG")]
    to: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2026-03-01")]
    date: String,
    #[schemars(description = "Return date in YYYY-MM-DD for round-trip. Omit for one-way")]
    return_date: Option<String>,
    #[schemars(
        description = "One of: economy, premium-economy, business, first. Default: economy"
    )]
    cabin: Option<String>,
    #[schemars(description = "Adult passengers (1-9). Default: 1")]
    adults: Option<u32>,
    #[schemars(description = "Currency code. Examples: USD, EUR, JPY. Default: USD")]
    currency: Option<String>,
    #[schemars(description = "One of: best, cheapest, fastest. Default: best")]
    sort: Option<String>,
    #[schemars(description = "Only return flights at or below this price")]
    max_price: Option<f64>,
    #[schemars(description = "Allowed stop counts, e.g. [0] for nonstop only")]
    stops: Option<Vec<u32>>,
    #[schemars(description = "Return only the first N results after sorting")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchAirportsArgs {
    #[schemars(description = "City, airport name or code. Example: London, LAX, Paris (CDG)")]
    query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PriceCalendarArgs {
    #[schemars(description = "Origin sky id / IATA code. Example: JFK")]
    from: String,
    #[schemars(description = "Destination sky id / IATA code. Example: LHR")]
    to: String,
    #[schemars(description = "First date of the calendar in YYYY-MM-DD format")]
    date: String,
    #[schemars(description = "Currency code. Default: USD")]
    currency: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct HealthArgs {
    #[schemars(description = "Ignore the cached result and probe the API again")]
    refresh: Option<bool>,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => tool_error(format!("failed to encode result: {e}")),
    }
}

#[derive(Clone)]
struct SkyscoutMcp {
    service: Arc<FlightService>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SkyscoutMcp {
    fn new(service: Arc<FlightService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search flights between two airports on a date. Returns JSON flights with airline, times, duration, stops and price. Falls back to sample data when the live API is unavailable; call api_health to find out which."
    )]
    async fn search_flights(
        &self,
        Parameters(args): Parameters<SearchFlightsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let cabin_class = match args.cabin.as_deref().map(CabinClass::from_str_loose).transpose() {
            Ok(c) => c.unwrap_or_default(),
            Err(e) => return tool_error(e.to_string()),
        };
        let sort = match args.sort.as_deref().map(SortOption::from_str_loose).transpose() {
            Ok(s) => s.unwrap_or_default(),
            Err(e) => return tool_error(e.to_string()),
        };

        let mut params = FlightSearchParams::one_way(
            (args.from.to_uppercase().as_str(), ""),
            (args.to.to_uppercase().as_str(), ""),
            &args.date,
        );
        params.return_date = args.return_date;
        params.cabin_class = cabin_class;
        params.adults = args.adults.unwrap_or(1);
        if let Some(currency) = args.currency {
            params.currency = currency.to_uppercase();
        }

        let params = match crate::resolve_search_params(&self.service, params).await {
            Ok(p) => p,
            Err(e) => return tool_error(e.to_string()),
        };
        if let Err(e) = params.validate() {
            return tool_error(e.to_string());
        }

        let orchestrator = SearchOrchestrator::new(Arc::clone(&self.service));
        orchestrator.perform_search(params).await;
        if let Some(err) = orchestrator.snapshot().error {
            return tool_error(err);
        }

        let current = orchestrator.snapshot().filters.price_range;
        orchestrator.set_filters(tool_filters(args.max_price, args.stops, current));
        orchestrator.set_sort(sort);

        let mut flights = orchestrator.filtered_flights();
        if let Some(n) = args.top {
            flights.truncate(n);
        }
        json_result(&flights)
    }

    #[tool(description = "Look up airports by city, name or code. Returns sky ids and entity ids usable for search_flights.")]
    async fn search_airports(
        &self,
        Parameters(args): Parameters<SearchAirportsArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.service.search_airport(&args.query).await {
            Ok(airports) => json_result(&airports),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(description = "Cheapest fare per day for a route over the next 30 days from the given date.")]
    async fn price_calendar(
        &self,
        Parameters(args): Parameters<PriceCalendarArgs>,
    ) -> Result<CallToolResult, McpError> {
        let currency = args.currency.unwrap_or_else(|| "USD".into());
        match self
            .service
            .price_calendar(&args.from.to_uppercase(), &args.to.to_uppercase(), &args.date, &currency)
            .await
        {
            Ok(days) => json_result(&days),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(description = "Report whether results come from the live flight API or from sample data.")]
    async fn api_health(
        &self,
        Parameters(args): Parameters<HealthArgs>,
    ) -> Result<CallToolResult, McpError> {
        let health = self.service.check_health(args.refresh.unwrap_or(false)).await;
        json_result(&health)
    }
}

fn tool_filters(max_price: Option<f64>, stops: Option<Vec<u32>>, current: PriceRange) -> FilterUpdate {
    FilterUpdate {
        price_range: max_price.map(|max| PriceRange {
            min: current.min.min(max),
            max,
        }),
        stops,
        ..Default::default()
    }
}

#[tool_handler]
impl ServerHandler for SkyscoutMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "skyscout".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flight search tool. Workflow: (1) search_airports if you only know a city. (2) search_flights with IATA codes. (3) price_calendar to find cheaper dates. api_health tells whether data is live or sample.".into(),
            ),
        }
    }
}

pub async fn run(options: FetchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let service = crate::service_from_env(&options)?;
    let server = SkyscoutMcp::new(service)
        .serve(rmcp::transport::stdio())
        .await?;
    server.waiting().await?;
    Ok(())
}
