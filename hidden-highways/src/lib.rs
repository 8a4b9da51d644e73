pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod llm;
pub mod models;
pub mod render;
pub mod search;
pub mod service;
pub mod tasks;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use config::{AppConfig, RecommendationMode};
pub use engine::{RecommendationEngine, RecommendationModel, RecommendationPrompt};
pub use error::{FailureKind, PipelineFailure};
pub use models::*;
pub use render::{RenderOutcome, ResultRenderer};
pub use search::{GooglePlacesClient, PlaceSearch};
pub use service::{AppState, build_router, create_app};
pub use workflow::{build_search_workflow, create_search_session};
