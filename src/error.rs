use thiserror::Error;

/// Statuses that are never retried, whatever the caller's retry list says.
pub const NEVER_RETRY_STATUSES: [u16; 5] = [400, 401, 402, 403, 429];

pub const DEFAULT_RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

const PASSTHROUGH_MAX_LEN: usize = 150;

#[derive(Debug, Clone, Error)]
pub enum FlightError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed ({0})")]
    ConnectionFailed(String),
    #[error("DNS resolution failed ({0})")]
    DnsResolution(String),
    #[error("proxy error ({0})")]
    ProxyError(String),
    #[error("TLS/SSL error ({0})")]
    TlsError(String),
    #[error("rate limited by the flight API (HTTP 429)")]
    RateLimited,
    #[error("unexpected HTTP status {0} from the flight API")]
    HttpStatus(u16),
    #[error("failed to parse flight API response: {0}")]
    InvalidResponse(String),
    #[error("no results in flight API response")]
    NoResults,
    #[error("no API key configured — set RAPIDAPI_KEY to query the live API")]
    NotConfigured,
    #[error("request cancelled")]
    Cancelled,
    #[error("invalid airport code \"{0}\" — expected a 3-letter code or sky id (e.g. JFK, LOND)")]
    InvalidAirport(String),
    #[error("invalid date \"{0}\" — must be YYYY-MM-DD format (e.g. 2026-03-01)")]
    InvalidDate(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Other(String),
}

impl FlightError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited => Some(429),
            Self::HttpStatus(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::DnsResolution(_) | Self::ProxyError(_) | Self::TlsError(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAirport(_) | Self::InvalidDate(_) | Self::Validation(_)
        )
    }
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

pub fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request — please check your search parameters".into(),
        401 => "Authentication failed — the API key is invalid or expired".into(),
        403 => "Access denied — your API plan does not allow this request".into(),
        404 => "The requested resource was not found".into(),
        408 => "The request timed out — please try again".into(),
        429 => "Too many requests — the API rate limit was reached, please wait a moment".into(),
        500 | 502 | 503 | 504 => {
            "The flight service is having problems — please try again later".into()
        }
        _ => format!("Request failed with status {status}"),
    }
}

const NETWORK_MESSAGE: &str = "Network error — please check your internet connection";
const TIMEOUT_MESSAGE: &str = "The request timed out — please try again";
const CANCELLED_MESSAGE: &str = "The request was cancelled";
const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred — please try again";

pub fn user_message(err: &FlightError, context: Option<&str>) -> String {
    let message = classify(err);
    match context {
        Some(ctx) if !ctx.is_empty() => format!("{ctx}: {message}"),
        _ => message,
    }
}

fn classify(err: &FlightError) -> String {
    if let Some(status) = err.status() {
        return status_message(status);
    }
    match err {
        e if e.is_network() => NETWORK_MESSAGE.into(),
        FlightError::Timeout => TIMEOUT_MESSAGE.into(),
        FlightError::Cancelled => CANCELLED_MESSAGE.into(),
        other => message_for_text(&other.to_string()),
    }
}

pub fn message_for_text(text: &str) -> String {
    let lower = text.to_lowercase();

    if lower.contains("fetch") || lower.contains("network") {
        return NETWORK_MESSAGE.into();
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return TIMEOUT_MESSAGE.into();
    }
    if lower.contains("abort") {
        return CANCELLED_MESSAGE.into();
    }
    if let Some(status) = embedded_status(text) {
        return status_message(status);
    }
    if !text.trim().is_empty() && text.len() < PASSTHROUGH_MAX_LEN && !looks_like_stack_trace(text)
    {
        return text.to_string();
    }
    UNEXPECTED_MESSAGE.into()
}

fn embedded_status(text: &str) -> Option<u16> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 3)
        .filter_map(|run| run.parse::<u16>().ok())
        .find(|code| (400..=599).contains(code))
}

fn looks_like_stack_trace(text: &str) -> bool {
    text.contains("\n    at ")
        || text.contains("stack backtrace")
        || text.contains("panicked at")
        || text.lines().count() > 3
}

pub fn is_retryable(err: &FlightError, retryable_statuses: &[u16]) -> bool {
    if let Some(status) = err.status() {
        if NEVER_RETRY_STATUSES.contains(&status) {
            return false;
        }
        return retryable_statuses.contains(&status);
    }
    match err {
        FlightError::NotConfigured | FlightError::Cancelled => false,
        e if e.is_validation() => false,
        _ => true,
    }
}
