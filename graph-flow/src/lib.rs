pub mod context;
pub mod error;
pub mod graph;
pub mod session;
pub mod task;

// Re-export commonly used types
pub use context::Context;
pub use error::{GraphError, Result};
pub use graph::{Edge, ExecutionResult, ExecutionStatus, Graph, GraphBuilder};
pub use session::Session;
pub use task::{NextAction, Task, TaskResult};
