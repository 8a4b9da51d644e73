use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// One place returned by the places text search.
///
/// Every field is optional on the wire; placeholders for missing values are chosen by
/// the formatter, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    #[serde(default, deserialize_with = "display_name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// 0-5 star average
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "userRatingCount")]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub price_level: Option<String>,
}

/// The places API sends `displayName` as `{ "text": .., "languageCode": .. }`;
/// older payloads and our own context round-trips use a plain string.
#[derive(Deserialize)]
#[serde(untagged)]
enum DisplayName {
    Plain(String),
    Localized { text: String },
}

fn display_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DisplayName>::deserialize(deserializer)?.map(|name| match name {
            DisplayName::Plain(text) | DisplayName::Localized { text } => text,
        }),
    )
}

/// A single verdict produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceRecommendation {
    /// The name of the place
    pub name: String,
    /// Your score for the place, from 0 to 10
    pub rating: f64,
    /// A brief explanation of why you recommend it
    pub reason: String,
}

/// Recommendations in the order the model returned them
pub type RecommendationSet = Vec<PlaceRecommendation>;

/// Schema root for structured output; providers require an object at the top level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceRecommendations {
    pub recommendations: Vec<PlaceRecommendation>,
}

/// Raw form body posted to `/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub what_i_want: String,
}

/// Validated input for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub search_query: String,
    pub preference: String,
}

impl TryFrom<SearchForm> for RecommendationRequest {
    type Error = ValidationError;

    fn try_from(form: SearchForm) -> Result<Self, Self::Error> {
        let search_query = form.query.trim();
        if search_query.is_empty() {
            return Err(ValidationError::MissingField("query"));
        }
        let preference = form.what_i_want.trim();
        if preference.is_empty() {
            return Err(ValidationError::MissingField("what_i_want"));
        }

        Ok(Self {
            search_query: search_query.to_string(),
            preference: preference.to_string(),
        })
    }
}
