use axum::{
    Router,
    extract::{Form, State, rejection::FormRejection},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Html,
    routing::{get, post},
};
use graph_flow::{ExecutionStatus, Graph};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    engine::{RecommendationEngine, RecommendationModel},
    error::{FailureKind, PipelineFailure},
    llm::model_from_config,
    models::{RecommendationRequest, SearchForm},
    render::ResultRenderer,
    search::{GooglePlacesClient, PlaceSearch},
    tasks::session_keys,
    workflow::{build_search_workflow, create_search_session},
};

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Graph>,
    pub renderer: ResultRenderer,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wire the pipeline from explicit collaborators
    pub fn new(
        search: Arc<dyn PlaceSearch>,
        model: Arc<dyn RecommendationModel>,
        renderer: ResultRenderer,
        request_timeout: Duration,
    ) -> Self {
        let workflow =
            build_search_workflow(search, RecommendationEngine::new(model), renderer.clone());

        Self {
            workflow: Arc::new(workflow),
            renderer,
            request_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let search = GooglePlacesClient::new(
            config.maps_api_key.clone(),
            config.places_base_url.clone(),
            config.search_timeout,
        )?;
        let renderer = ResultRenderer::new()?;

        Ok(Self::new(
            Arc::new(search),
            model_from_config(config),
            renderer,
            config.request_timeout,
        ))
    }
}

pub fn create_app(config: &AppConfig) -> anyhow::Result<Router> {
    Ok(build_router(AppState::from_config(config)?))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/search", post(search))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tag every request with a correlation id and run it inside a span carrying it
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header_value {
        request
            .headers_mut()
            .insert(CORRELATION_ID_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    state.renderer.render_index().map(Html).map_err(|e| {
        error!(error = %e, "Failed to render index page");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Always answers 200 with a fragment; failures become error blocks
async fn search(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Html<String> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable search form");
            return Html(state.renderer.render_failure(PipelineFailure::new(
                FailureKind::Validation,
                "The search form could not be read",
            )));
        }
    };

    let request = match RecommendationRequest::try_from(form) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected search request");
            return Html(state.renderer.render_failure(e.into()));
        }
    };

    info!(
        query = %request.search_query,
        preference = %request.preference,
        "Processing search request"
    );

    match run_search_workflow(&state, request).await {
        Ok(html) => Html(html),
        Err(failure) => {
            error!(
                failure_kind = failure.kind.as_str(),
                message = %failure.message,
                "Search workflow aborted"
            );
            Html(state.renderer.render_failure(failure))
        }
    }
}

async fn run_search_workflow(
    state: &AppState,
    request: RecommendationRequest,
) -> Result<String, PipelineFailure> {
    let mut session =
        create_search_session(&state.workflow, request, state.request_timeout).await?;
    let execution = state.workflow.execute_session(&mut session).await?;

    // Rendered failures still return 200; surface them in the logs
    if let Some(failure) = session
        .context
        .get::<PipelineFailure>(session_keys::FAILURE)
        .await
    {
        error!(
            session_id = %session.id,
            failure_kind = failure.kind.as_str(),
            message = %failure.message,
            "Search completed with a failure"
        );
    }

    match execution.status {
        ExecutionStatus::Completed => execution.response.ok_or_else(|| {
            PipelineFailure::new(FailureKind::Internal, "Workflow completed without a response")
        }),
        ExecutionStatus::Paused => Err(PipelineFailure::new(
            FailureKind::Internal,
            format!("Workflow stopped early at {}", session.current_task_id),
        )),
    }
}
