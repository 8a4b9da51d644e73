use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use tracing::info;

use crate::{
    error::PipelineFailure,
    models::{RecommendationRequest, RecommendationSet},
    render::{RenderOutcome, ResultRenderer},
};

use super::session_keys;

/// Single exit of the pipeline: turns whatever the earlier tasks left behind into HTML
pub struct RenderResultsTask {
    renderer: ResultRenderer,
}

impl RenderResultsTask {
    pub fn new(renderer: ResultRenderer) -> Self {
        Self { renderer }
    }
}

/// Failure first, then recommendations, otherwise the search came back empty
async fn outcome_from_context(context: &Context) -> Result<RenderOutcome> {
    if let Some(failure) = context.get::<PipelineFailure>(session_keys::FAILURE).await {
        return Ok(RenderOutcome::Failed(failure));
    }

    if let Some(recommendations) = context
        .get::<RecommendationSet>(session_keys::RECOMMENDATIONS)
        .await
    {
        return Ok(RenderOutcome::Recommendations(recommendations));
    }

    let request: RecommendationRequest = context
        .get(session_keys::REQUEST)
        .await
        .ok_or_else(|| GraphError::ContextError("request not found in context".into()))?;

    Ok(RenderOutcome::NoResults {
        query: request.search_query,
    })
}

#[async_trait]
impl Task for RenderResultsTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let outcome = outcome_from_context(&context).await?;
        info!(
            outcome = match &outcome {
                RenderOutcome::Recommendations(_) => "recommendations",
                RenderOutcome::NoResults { .. } => "no_results",
                RenderOutcome::Failed(failure) => failure.kind.as_str(),
            },
            "Rendering results"
        );

        let html = self
            .renderer
            .render(&outcome)
            .map_err(|e| GraphError::TaskExecutionFailed(e.to_string()))?;

        Ok(TaskResult::new_with_status(
            Some(html),
            NextAction::End,
            Some("Results rendered".to_string()),
        ))
    }
}
