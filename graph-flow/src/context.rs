use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Context for sharing data between tasks in a graph execution.
///
/// Cloning is cheap: clones share the same underlying map, so a value set by one
/// task is visible to every task that runs after it.
#[derive(Clone, Debug)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            deadline: None,
        }
    }

    /// Create a context whose tasks must all finish within `budget` from now
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            deadline: Some(Instant::now() + budget),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when the context is unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        self.set_sync(key, value);
    }

    pub fn set_sync(&self, key: impl Into<String>, value: impl serde::Serialize) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key, value);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Dropping context value that failed to serialize")
            }
        }
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_sync(key)
    }

    /// Synchronous read, usable from edge conditions
    pub fn get_sync<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub async fn clear(&self) {
        self.data.clear();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
