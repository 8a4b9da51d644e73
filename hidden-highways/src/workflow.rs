use graph_flow::{Context, Graph, GraphBuilder, Session, Task};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    engine::RecommendationEngine,
    models::{PlaceRecord, RecommendationRequest},
    render::ResultRenderer,
    search::PlaceSearch,
    tasks::{RecommendTask, RenderResultsTask, SearchPlacesTask, session_keys},
};

pub const SEARCH_WORKFLOW_ID: &str = "search_workflow";

/// search -> (places found ? recommend -> render : render)
pub fn build_search_workflow(
    search: Arc<dyn PlaceSearch>,
    engine: RecommendationEngine,
    renderer: ResultRenderer,
) -> Graph {
    let search_task = Arc::new(SearchPlacesTask::new(search));
    let search_id = search_task.id().to_string();

    let recommend_task = Arc::new(RecommendTask::new(engine));
    let recommend_id = recommend_task.id().to_string();

    let render_task = Arc::new(RenderResultsTask::new(renderer));
    let render_id = render_task.id().to_string();

    GraphBuilder::new(SEARCH_WORKFLOW_ID)
        .add_task(search_task)
        .add_task(recommend_task)
        .add_task(render_task)
        .add_conditional_edge(&search_id, has_places, &recommend_id, &render_id)
        .add_edge(&recommend_id, &render_id)
        .build()
}

/// Only ask the model when the search succeeded and found something
fn has_places(context: &Context) -> bool {
    !context.contains_key(session_keys::FAILURE)
        && context
            .get_sync::<Vec<PlaceRecord>>(session_keys::PLACES)
            .is_some_and(|places| !places.is_empty())
}

/// Fresh session for one `/search` request, bounded by `timeout`
pub async fn create_search_session(
    graph: &Graph,
    request: RecommendationRequest,
    timeout: Duration,
) -> graph_flow::Result<Session> {
    let context = Context::with_timeout(timeout);
    context.set(session_keys::REQUEST, request).await;
    graph.start_session(Uuid::new_v4().to_string(), context)
}
