use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    context::Context,
    error::{GraphError, Result},
    session::Session,
    task::{NextAction, Task, TaskResult},
};

/// Upper bound on tasks executed by one `execute_session` call
const DEFAULT_MAX_STEPS: usize = 64;

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Edge between tasks in the graph
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<EdgeCondition>,
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// A graph of tasks that can be executed.
///
/// Graphs are assembled once with [`GraphBuilder`] and are read-only afterwards, so a
/// single `Arc<Graph>` can serve any number of concurrent sessions.
pub struct Graph {
    pub id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
    max_steps: usize,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Open a session positioned at the start task
    pub fn start_session(
        &self,
        session_id: impl Into<String>,
        context: Context,
    ) -> Result<Session> {
        let start = self.start_task_id().ok_or_else(|| {
            GraphError::InvalidGraph(format!("graph {} has no tasks", self.id))
        })?;

        let mut session = Session::new_from_task(session_id.into(), start).with_context(context);
        session.graph_id = self.id.clone();
        Ok(session)
    }

    /// Execute the session from its current task.
    ///
    /// Tasks returning `ContinueAndExecute` or `GoTo` chain into the next task within the
    /// same call. The call returns when a task ends the graph, yields with `Continue`, or
    /// when no outgoing edge matches.
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        for _ in 0..self.max_steps {
            let result = self
                .execute_single_task(&session.current_task_id, &session.context)
                .await?;

            if result.status_message.is_some() {
                session.status_message = result.status_message.clone();
            }

            match &result.next_action {
                NextAction::Continue => {
                    if let Some(next_task_id) =
                        self.find_next_task(&result.task_id, &session.context)
                    {
                        session.current_task_id = next_task_id;
                    }
                    return Ok(ExecutionResult {
                        response: result.response,
                        status: ExecutionStatus::Paused,
                    });
                }
                NextAction::ContinueAndExecute => {
                    match self.find_next_task(&result.task_id, &session.context) {
                        Some(next_task_id) => session.current_task_id = next_task_id,
                        None => {
                            warn!(
                                graph_id = %self.id,
                                task_id = %result.task_id,
                                "No outgoing edge matched, pausing"
                            );
                            return Ok(ExecutionResult {
                                response: result.response,
                                status: ExecutionStatus::Paused,
                            });
                        }
                    }
                }
                NextAction::GoTo(target_id) => {
                    if !self.tasks.contains_key(target_id) {
                        return Err(GraphError::TaskNotFound(target_id.clone()));
                    }
                    session.current_task_id = target_id.clone();
                }
                NextAction::End => {
                    return Ok(ExecutionResult {
                        response: result.response,
                        status: ExecutionStatus::Completed,
                    });
                }
            }
        }

        Err(GraphError::InvalidGraph(format!(
            "graph {} exceeded {} steps in one execution",
            self.id, self.max_steps
        )))
    }

    /// Execute a single task, bounded by the context deadline when one is set
    async fn execute_single_task(&self, task_id: &str, context: &Context) -> Result<TaskResult> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        let deadline_exceeded = || GraphError::DeadlineExceeded {
            task_id: task_id.to_string(),
        };

        debug!(graph_id = %self.id, task_id = %task_id, "Running task");

        let mut result = match context.deadline() {
            Some(_) if context.is_expired() => return Err(deadline_exceeded()),
            Some(deadline) => tokio::time::timeout_at(deadline, task.run(context.clone()))
                .await
                .map_err(|_| deadline_exceeded())??,
            None => task.run(context.clone()).await?,
        };

        result.task_id = task_id.to_string();
        Ok(result)
    }

    /// Find the next task: the first edge out of `current_task_id` whose condition holds
    pub fn find_next_task(&self, current_task_id: &str, context: &Context) -> Option<String> {
        self.edges
            .iter()
            .filter(|edge| edge.from == current_task_id)
            .find(|edge| {
                edge.condition
                    .as_ref()
                    .is_none_or(|condition| condition(context))
            })
            .map(|edge| edge.to.clone())
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Option<&str> {
        self.start_task_id.as_deref()
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_id).cloned()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    /// Add a task; the first task added becomes the start task
    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        let task_id = task.id().to_string();
        if self.graph.start_task_id.is_none() {
            self.graph.start_task_id = Some(task_id.clone());
        }
        self.graph.tasks.insert(task_id, task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            condition: None,
        });
        self
    }

    /// Route from `from` to `yes` when `condition` holds, otherwise to `no`
    pub fn add_conditional_edge<F>(
        mut self,
        from: impl Into<String>,
        condition: F,
        yes: impl Into<String>,
        no: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        let from = from.into();
        let condition: EdgeCondition = Arc::new(condition);
        let negated = {
            let condition = condition.clone();
            Arc::new(move |ctx: &Context| !condition(ctx)) as EdgeCondition
        };

        self.graph.edges.push(Edge {
            from: from.clone(),
            to: yes.into(),
            condition: Some(condition),
        });
        self.graph.edges.push(Edge {
            from,
            to: no.into(),
            condition: Some(negated),
        });
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.graph.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Status of graph execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// A task yielded before the graph ended; the session points at the next task
    Paused,
    /// Workflow completed successfully
    Completed,
}
