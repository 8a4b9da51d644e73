use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    error::PipelineFailure,
    models::RecommendationRequest,
    search::PlaceSearch,
};

use super::session_keys;

/// Runs the places text search for the request's query
pub struct SearchPlacesTask {
    search: Arc<dyn PlaceSearch>,
}

impl SearchPlacesTask {
    pub fn new(search: Arc<dyn PlaceSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Task for SearchPlacesTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let request: RecommendationRequest = context
            .get(session_keys::REQUEST)
            .await
            .ok_or_else(|| GraphError::ContextError("request not found in context".into()))?;

        info!(query = %request.search_query, "Starting places search task");

        let status = match self.search.search(&request.search_query).await {
            Ok(places) => {
                let status = format!("Found {} places", places.len());
                context.set(session_keys::PLACES, places).await;
                status
            }
            Err(e) => {
                error!(query = %request.search_query, error = %e, "Places search failed");
                let failure = PipelineFailure::from(e);
                let status = format!("Search failed: {}", failure.kind.as_str());
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
