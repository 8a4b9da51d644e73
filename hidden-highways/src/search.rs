//! Places text-search client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::{error::SearchError, models::PlaceRecord};

const SEARCH_TEXT_PATH: &str = "/v1/places:searchText";

/// Anything that can turn a free-text query into place records
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<PlaceRecord>,
}

/// Client for the Google Places `searchText` endpoint
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GooglePlacesClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout,
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            SEARCH_TEXT_PATH
        )
    }
}

/// Log line for a failed search, by status
fn describe_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request: the search request is invalid",
        StatusCode::UNAUTHORIZED => "Unauthorized: check the places API key",
        StatusCode::FORBIDDEN => "Forbidden: the key may not access the places API",
        StatusCode::NOT_FOUND => "Not Found: the search endpoint could not be found",
        _ => "Places API error",
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    #[instrument(skip(self), fields(provider = "google_places"))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError> {
        let url = self.search_url();
        debug!(url = %url, "Sending places text search");

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", "*")
            .json(&json!({ "textQuery": query }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout { timeout: self.timeout }
                } else {
                    SearchError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %message, "{}", describe_status(status));
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchTextResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        info!(places = body.places.len(), "Places search completed");
        Ok(body.places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_joins_base() {
        let client = GooglePlacesClient::new(
            "key",
            "https://places.googleapis.com/",
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            client.search_url(),
            "https://places.googleapis.com/v1/places:searchText"
        );
    }

    #[test]
    fn test_missing_places_key_is_empty() {
        let body: SearchTextResponse = serde_json::from_str("{}").unwrap();
        assert!(body.places.is_empty());
    }

    #[test]
    fn test_status_descriptions() {
        assert!(describe_status(StatusCode::UNAUTHORIZED).contains("API key"));
        assert_eq!(describe_status(StatusCode::BAD_GATEWAY), "Places API error");
    }
}
