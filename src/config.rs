use std::fmt;

pub const DEFAULT_API_HOST: &str = "sky-scrapper.p.rapidapi.com";
pub const API_KEY_VAR: &str = "RAPIDAPI_KEY";
pub const API_HOST_VAR: &str = "RAPIDAPI_HOST";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
    pub api_host: String,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>, api_host: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_host: api_host.into(),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new("", DEFAULT_API_HOST)
    }

    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        let api_host = std::env::var(API_HOST_VAR)
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        Self { api_key, api_host }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn base_url(&self) -> String {
        format!("https://{}", self.api_host.trim())
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.is_configured() {
            "<redacted>"
        } else {
            "<unset>"
        };
        f.debug_struct("ApiConfig")
            .field("api_key", &key)
            .field("api_host", &self.api_host)
            .finish()
    }
}
