//! Prompt construction and the model seam for recommendations.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::RecommendError,
    formatter::format_places,
    models::{PlaceRecommendation, PlaceRecommendations, PlaceRecord, RecommendationSet},
};

pub const SYSTEM_PROMPT: &str = "You are a travel assistant helping users discover local gems during their road trips. \
The user wants to find unique, high-quality, local restaurants, coffee shops, and bakeries, avoiding big chains that advertise on highways. \
Based on the data provided, please review the list of places and select those that are likely to be locally owned, \
offer a unique experience, or have exceptional reviews. \
For each recommendation give the name of the place, your rating (0-10), and a brief explanation of why you recommend it.";

/// Two-message prompt: fixed persona plus the place table and what the user wants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationPrompt {
    pub system: String,
    pub user: String,
}

impl RecommendationPrompt {
    pub fn new(places: &[PlaceRecord], preference: &str) -> Self {
        let table = format_places(places);
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "Here is the list of places:\n{table}\n\nPlease review and provide your recommendations. \
For this review, the user is looking for a {preference}."
            ),
        }
    }
}

/// A model that turns a prompt into recommendations
#[async_trait]
pub trait RecommendationModel: Send + Sync {
    async fn invoke(
        &self,
        prompt: &RecommendationPrompt,
    ) -> Result<RecommendationSet, RecommendError>;
}

/// Builds the prompt and asks the model; holds no per-request state
#[derive(Clone)]
pub struct RecommendationEngine {
    model: Arc<dyn RecommendationModel>,
}

impl RecommendationEngine {
    pub fn new(model: Arc<dyn RecommendationModel>) -> Self {
        Self { model }
    }

    pub async fn recommend(
        &self,
        places: &[PlaceRecord],
        preference: &str,
    ) -> Result<RecommendationSet, RecommendError> {
        let prompt = RecommendationPrompt::new(places, preference);
        let recommendations = self.model.invoke(&prompt).await?;

        for rec in recommendations
            .iter()
            .filter(|r| !(0.0..=10.0).contains(&r.rating))
        {
            warn!(name = %rec.name, rating = rec.rating, "Model score outside 0-10");
        }
        info!(
            places = places.len(),
            recommendations = recommendations.len(),
            "Recommendations received"
        );

        Ok(recommendations)
    }
}

/// Shapes a free-text model may reasonably answer with
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRecommendations {
    Wrapped(PlaceRecommendations),
    List(Vec<PlaceRecommendation>),
    Single(PlaceRecommendation),
}

/// Parse a model's free-text answer as recommendations.
///
/// Literal `\n` escape sequences are turned into newlines and Markdown code fences are
/// removed before parsing.
pub fn parse_recommendations_json(raw: &str) -> Result<RecommendationSet, RecommendError> {
    let cleaned = raw.replace("\\n", "\n");
    let trimmed = cleaned.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|body| body.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let parsed = serde_json::from_str::<JsonRecommendations>(unfenced)
        .map_err(|e| RecommendError::SchemaValidation(format!("{e}. Raw response: {raw}")))?;

    Ok(match parsed {
        JsonRecommendations::Wrapped(wrapped) => wrapped.recommendations,
        JsonRecommendations::List(list) => list,
        JsonRecommendations::Single(single) => vec![single],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingModel {
        prompts: Mutex<Vec<RecommendationPrompt>>,
        reply: RecommendationSet,
    }

    #[async_trait]
    impl RecommendationModel for RecordingModel {
        async fn invoke(
            &self,
            prompt: &RecommendationPrompt,
        ) -> Result<RecommendationSet, RecommendError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            Ok(self.reply.clone())
        }
    }

    fn rec(name: &str, rating: f64, reason: &str) -> PlaceRecommendation {
        PlaceRecommendation {
            name: name.into(),
            rating,
            reason: reason.into(),
        }
    }

    #[test]
    fn test_prompt_contains_table_and_preference() {
        let places = vec![PlaceRecord {
            display_name: Some("Joe's Diner".into()),
            ..Default::default()
        }];
        let prompt = RecommendationPrompt::new(&places, "coffee shop");

        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.system.contains("avoiding big chains"));
        assert!(prompt.user.contains("Name: Joe's Diner, Address: Unknown"));
        assert!(prompt.user.ends_with("the user is looking for a coffee shop."));
    }

    #[tokio::test]
    async fn test_engine_keeps_model_order() {
        let model = Arc::new(RecordingModel {
            prompts: Mutex::new(Vec::new()),
            reply: vec![
                rec("B", 7.0, "second"),
                rec("A", 9.0, "first"),
                rec("C", 12.0, "off scale"),
            ],
        });
        let engine = RecommendationEngine::new(model.clone());

        let result = engine
            .recommend(&[PlaceRecord::default()], "bakery")
            .await
            .unwrap();

        let names: Vec<&str> = result.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let raw = r#"{"recommendations": [{"name": "Joe's Diner", "rating": 9, "reason": "Local favorite"}]}"#;
        assert_eq!(
            parse_recommendations_json(raw).unwrap(),
            vec![rec("Joe's Diner", 9.0, "Local favorite")]
        );
    }

    #[test]
    fn test_parse_bare_list_with_escaped_newlines_and_fence() {
        let raw = "```json\\n[\\n  {\"name\": \"Red Hen\", \"rating\": 8.5, \"reason\": \"Great bread\"},\\n  {\"name\": \"Zack's\", \"rating\": 7, \"reason\": \"Quirky\"}\\n]\\n```";
        let parsed = parse_recommendations_json(raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Red Hen");
        assert_eq!(parsed[1].rating, 7.0);
    }

    #[test]
    fn test_parse_single_object() {
        let raw = r#"{"name": "Solo", "rating": 6, "reason": "Only one"}"#;
        assert_eq!(parse_recommendations_json(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_malformed_is_schema_error() {
        let err =
            parse_recommendations_json("Sure! Here are my picks: Joe's Diner").unwrap_err();
        assert!(
            matches!(err, RecommendError::SchemaValidation(msg) if msg.contains("Raw response"))
        );

        let err = parse_recommendations_json(r#"[{"name": "No score"}]"#).unwrap_err();
        assert!(matches!(err, RecommendError::SchemaValidation(_)));
    }
}
