use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// How the model is asked for recommendations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecommendationMode {
    /// Provider-enforced JSON schema
    #[default]
    Structured,
    /// Plain completion told to answer with JSON, parsed by us
    JsonText,
}

impl FromStr for RecommendationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "json_text" | "json-text" | "text" => Ok(Self::JsonText),
            _ => Err(()),
        }
    }
}

/// Process configuration, read once at startup
#[derive(Clone)]
pub struct AppConfig {
    pub maps_api_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub recommendation_mode: RecommendationMode,
    pub places_base_url: String,
    pub search_timeout: Duration,
    pub request_timeout: Duration,
    pub port: u16,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_model", &self.openai_model)
            .field("recommendation_mode", &self.recommendation_mode)
            .field("places_base_url", &self.places_base_url)
            .field("search_timeout", &self.search_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load from the process environment, after applying a `.env` file if one exists
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let maps_api_key = required("MAPS_KEY")?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let openai_model = lookup("OPENAI_MODEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let recommendation_mode = match lookup("RECOMMENDATION_MODE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "RECOMMENDATION_MODE",
                value,
            })?,
            None => RecommendationMode::default(),
        };

        let places_base_url = lookup("PLACES_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PLACES_BASE_URL.to_string());

        let search_timeout_secs =
            parse_or(&lookup, "SEARCH_TIMEOUT_SECS", DEFAULT_SEARCH_TIMEOUT_SECS)?;
        let request_timeout_secs =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        Ok(Self {
            maps_api_key,
            openai_api_key,
            openai_model,
            recommendation_mode,
            places_base_url,
            search_timeout: Duration::from_secs(search_timeout_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            port,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
