use thiserror::Error;

/// Errors raised while executing a graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Context error: {0}")]
    ContextError(String),

    /// The request-scoped deadline elapsed while `task_id` was running or about to run
    #[error("Deadline exceeded before task {task_id} completed")]
    DeadlineExceeded { task_id: String },

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
