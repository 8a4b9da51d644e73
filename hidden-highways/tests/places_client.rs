//! GooglePlacesClient against a mocked places API.

use std::time::Duration;

use hidden_highways::error::SearchError;
use hidden_highways::{GooglePlacesClient, PlaceSearch};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/v1/places:searchText";

fn client(server: &MockServer) -> GooglePlacesClient {
    GooglePlacesClient::new("test-maps-key", server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_sends_query_with_key_and_field_mask() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(header("X-Goog-Api-Key", "test-maps-key"))
        .and(header("X-Goog-FieldMask", "*"))
        .and(body_json(json!({ "textQuery": "Coffee in Middlesex VT" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "places": [
                {
                    "displayName": { "text": "Red Hen Baking Co.", "languageCode": "en" },
                    "formattedAddress": "961 US-2, Middlesex, VT 05602, USA",
                    "rating": 4.7,
                    "userRatingCount": 812,
                    "priceLevel": "PRICE_LEVEL_INEXPENSIVE"
                },
                {
                    "displayName": { "text": "Starbucks" }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let places = client(&server)
        .search("Coffee in Middlesex VT")
        .await
        .unwrap();

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].display_name.as_deref(), Some("Red Hen Baking Co."));
    assert_eq!(places[0].user_ratings_total, Some(812));
    assert_eq!(places[0].rating, Some(4.7));
    assert_eq!(places[1].display_name.as_deref(), Some("Starbucks"));
    assert_eq!(places[1].formatted_address, None);
}

#[tokio::test]
async fn test_missing_places_key_means_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let places = client(&server).search("Nothing here").await.unwrap();
    assert!(places.is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = client(&server).search("Coffee").await.unwrap_err();
    match err {
        SearchError::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client(&server).search("Coffee").await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_slow_api_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "places": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client =
        GooglePlacesClient::new("test-maps-key", server.uri(), Duration::from_millis(100))
            .unwrap();
    let err = client.search("Coffee").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Places API request timed out after 100ms"
    );
    match err {
        SearchError::Timeout { timeout } => assert_eq!(timeout, Duration::from_millis(100)),
        other => panic!("expected Timeout error, got {other:?}"),
    }
}
