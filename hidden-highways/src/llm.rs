//! rig-backed implementations of [`RecommendationModel`].

use async_trait::async_trait;
use rig::{
    client::CompletionClient, completion::Prompt, extractor::ExtractionError, providers::openai,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    config::{AppConfig, RecommendationMode},
    engine::{RecommendationModel, RecommendationPrompt, parse_recommendations_json},
    error::RecommendError,
    models::{PlaceRecommendations, RecommendationSet},
};

const JSON_ONLY_INSTRUCTION: &str = "Please return your recommendations to the user as JSON: a list of objects with three keys, \
\"name\", \"rating\" and \"reason\". Return the JSON and nothing else.";

/// Schema-constrained output through a rig extractor
#[derive(Clone)]
pub struct StructuredModel {
    client: openai::Client,
    model: String,
}

impl StructuredModel {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl RecommendationModel for StructuredModel {
    async fn invoke(
        &self,
        prompt: &RecommendationPrompt,
    ) -> Result<RecommendationSet, RecommendError> {
        let extractor = self
            .client
            .extractor::<PlaceRecommendations>(&self.model)
            .preamble(&prompt.system)
            .build();

        debug!(model = %self.model, "Invoking structured recommendation model");

        let output = extractor.extract(prompt.user.clone()).await.map_err(|e| {
            error!(model = %self.model, error = %e, "Structured extraction failed");
            match e {
                ExtractionError::CompletionError(e) => {
                    RecommendError::ModelInvocation(e.to_string())
                }
                other => RecommendError::SchemaValidation(other.to_string()),
            }
        })?;

        Ok(output.recommendations)
    }
}

/// Free-text completion told to answer with JSON, parsed locally
#[derive(Clone)]
pub struct JsonTextModel {
    client: openai::Client,
    model: String,
}

impl JsonTextModel {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl RecommendationModel for JsonTextModel {
    async fn invoke(
        &self,
        prompt: &RecommendationPrompt,
    ) -> Result<RecommendationSet, RecommendError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&format!("{} {}", prompt.system, JSON_ONLY_INSTRUCTION))
            .build();

        debug!(model = %self.model, "Invoking JSON text recommendation model");

        let raw = agent.prompt(prompt.user.clone()).await.map_err(|e| {
            error!(model = %self.model, error = %e, "Model prompt failed");
            RecommendError::ModelInvocation(e.to_string())
        })?;

        debug!(raw = %raw, "Model returned text");
        parse_recommendations_json(&raw)
    }
}

/// Pick the adapter named by the configuration
pub fn model_from_config(config: &AppConfig) -> Arc<dyn RecommendationModel> {
    match config.recommendation_mode {
        RecommendationMode::Structured => Arc::new(StructuredModel::new(
            &config.openai_api_key,
            config.openai_model.clone(),
        )),
        RecommendationMode::JsonText => Arc::new(JsonTextModel::new(
            &config.openai_api_key,
            config.openai_model.clone(),
        )),
    }
}
