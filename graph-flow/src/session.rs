use crate::context::Context;

/// Cursor over one execution of a graph.
///
/// A session records which task runs next and owns the context the tasks share.
/// Sessions live only as long as the caller keeps them; nothing here persists them.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub graph_id: String,
    pub current_task_id: String,
    pub status_message: Option<String>,
    pub context: Context,
}

impl Session {
    pub fn new_from_task(sid: String, task_name: &str) -> Self {
        Self {
            id: sid,
            graph_id: "default".to_string(),
            current_task_id: task_name.to_string(),
            status_message: None,
            context: Context::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}
