//! Error types for each hop of the search pipeline.

use graph_flow::GraphError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the places API
#[derive(Debug, Error)]
pub enum SearchError {
    /// The API answered with a non-200 status
    #[error("Places API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Places API request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Places API request failed: {0}")]
    Request(String),

    #[error("Could not parse places API response: {0}")]
    Parse(String),
}

/// Failure producing recommendations
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The model call itself failed (network, auth, quota)
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// The model answered, but not with the expected shape
    #[error("Model output did not match the recommendation schema: {0}")]
    SchemaValidation(String),
}

/// Template failure while producing a fragment
#[derive(Debug, Error)]
#[error("Rendering failed: {0}")]
pub struct RenderError(#[from] tera::Error);

/// Missing or empty form input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The {0} field is required")]
    MissingField(&'static str),
}

/// Startup configuration problems; these abort the process
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// What went wrong, as shown to the user and recorded in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    SearchApi,
    ModelInvocation,
    SchemaValidation,
    Timeout,
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::SearchApi => "search_api",
            Self::ModelInvocation => "model_invocation",
            Self::SchemaValidation => "schema_validation",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        }
    }

    /// Heading shown above the failure description
    pub fn title(self) -> &'static str {
        match self {
            Self::Validation => "Please fill in both fields",
            Self::SearchApi => "The place search failed",
            Self::ModelInvocation => "The recommendation service is unavailable",
            Self::SchemaValidation => "Failed to parse response",
            Self::Timeout => "The search took too long",
            Self::Internal => "Something went wrong",
        }
    }
}

/// A failure captured somewhere in the pipeline, carried to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl PipelineFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<SearchError> for PipelineFailure {
    fn from(e: SearchError) -> Self {
        let kind = match e {
            SearchError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::SearchApi,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<RecommendError> for PipelineFailure {
    fn from(e: RecommendError) -> Self {
        let kind = match e {
            RecommendError::ModelInvocation(_) => FailureKind::ModelInvocation,
            RecommendError::SchemaValidation(_) => FailureKind::SchemaValidation,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ValidationError> for PipelineFailure {
    fn from(e: ValidationError) -> Self {
        Self::new(FailureKind::Validation, e.to_string())
    }
}

impl From<RenderError> for PipelineFailure {
    fn from(e: RenderError) -> Self {
        Self::new(FailureKind::Internal, e.to_string())
    }
}

impl From<GraphError> for PipelineFailure {
    fn from(e: GraphError) -> Self {
        let kind = match e {
            GraphError::DeadlineExceeded { .. } => FailureKind::Timeout,
            _ => FailureKind::Internal,
        };
        Self::new(kind, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_errors_map_to_kinds() {
        let failure = PipelineFailure::from(SearchError::Api {
            status: 401,
            message: "API key not valid".into(),
        });
        assert_eq!(failure.kind, FailureKind::SearchApi);
        assert!(failure.message.contains("401"));

        let failure = PipelineFailure::from(SearchError::Timeout {
            timeout: Duration::from_millis(250),
        });
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(failure.message.ends_with("timed out after 250ms"));
    }

    #[test]
    fn test_graph_deadline_is_timeout() {
        let failure = PipelineFailure::from(GraphError::DeadlineExceeded {
            task_id: "search".into(),
        });
        assert_eq!(failure.kind, FailureKind::Timeout);

        let failure = PipelineFailure::from(GraphError::ContextError("places missing".into()));
        assert_eq!(failure.kind, FailureKind::Internal);
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let value = serde_json::to_value(FailureKind::SchemaValidation).unwrap();
        assert_eq!(value, serde_json::json!("schema_validation"));
        assert_eq!(FailureKind::SchemaValidation.as_str(), "schema_validation");
    }
}
