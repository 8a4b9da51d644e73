use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use tracing::{error, info};

use crate::{
    engine::RecommendationEngine,
    error::PipelineFailure,
    models::{PlaceRecord, RecommendationRequest},
};

use super::session_keys;

/// Asks the model which of the found places are worth a stop
pub struct RecommendTask {
    engine: RecommendationEngine,
}

impl RecommendTask {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Task for RecommendTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let request: RecommendationRequest = context
            .get(session_keys::REQUEST)
            .await
            .ok_or_else(|| GraphError::ContextError("request not found in context".into()))?;

        let places: Vec<PlaceRecord> = context
            .get(session_keys::PLACES)
            .await
            .ok_or_else(|| GraphError::ContextError("places not found in context".into()))?;

        info!(
            places = places.len(),
            preference = %request.preference,
            "Starting recommendation task"
        );

        let status = match self.engine.recommend(&places, &request.preference).await {
            Ok(recommendations) => {
                let status = format!("Model recommended {} places", recommendations.len());
                context
                    .set(session_keys::RECOMMENDATIONS, recommendations)
                    .await;
                status
            }
            Err(e) => {
                error!(error = %e, "Recommendation failed");
                let failure = PipelineFailure::from(e);
                let status = format!("Recommendation failed: {}", failure.kind.as_str());
                context.set(session_keys::FAILURE, failure).await;
                status
            }
        };

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some(status),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, RecommendError};
    use crate::models::{PlaceRecommendation, RecommendationSet};
    use crate::test_support::StubModel;
    use std::sync::Arc;

    async fn seeded_context() -> Context {
        let context = Context::new();
        context
            .set(
                session_keys::REQUEST,
                RecommendationRequest {
                    search_query: "Bakery near Montpelier".into(),
                    preference: "bakery".into(),
                },
            )
            .await;
        context
            .set(session_keys::PLACES, vec![PlaceRecord::default()])
            .await;
        context
    }

    #[tokio::test]
    async fn test_recommendations_are_stored() {
        let model = Arc::new(StubModel::replying(vec![PlaceRecommendation {
            name: "Red Hen".into(),
            rating: 9.0,
            reason: "Bread".into(),
        }]));
        let task = RecommendTask::new(RecommendationEngine::new(model.clone()));
        let context = seeded_context().await;

        task.run(context.clone()).await.unwrap();

        let stored: RecommendationSet = context.get(session_keys::RECOMMENDATIONS).await.unwrap();
        assert_eq!(stored[0].name, "Red Hen");
        assert_eq!(model.calls(), 1);
        assert!(model.prompts()[0].user.contains("looking for a bakery"));
    }

    #[tokio::test]
    async fn test_model_failure_is_recorded() {
        let model = Arc::new(StubModel::failing(|| {
            RecommendError::ModelInvocation("quota exceeded".into())
        }));
        let task = RecommendTask::new(RecommendationEngine::new(model));
        let context = seeded_context().await;

        task.run(context.clone()).await.unwrap();

        let failure: PipelineFailure = context.get(session_keys::FAILURE).await.unwrap();
        assert_eq!(failure.kind, FailureKind::ModelInvocation);
        assert!(!context.contains_key(session_keys::RECOMMENDATIONS));
    }
}
