#[cfg(feature = "storage")]
pub mod sqlite;
pub mod memory;

use async_trait::async_trait;
use crate::core::{Todo, TodoDraft, TodoError, TodoId};

/// Name of the collection every todo document lives in.
pub const COLLECTION: &str = "todos";

/// A collection of todo documents. Each call is one round trip to the backend.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, or those whose description contains `query` (case-sensitive).
    async fn search(&self, query: Option<&str>) -> Result<Vec<Todo>, TodoError>;
    async fn get_by_id(&self, id: TodoId) -> Result<Todo, TodoError>;
    async fn create(&self, draft: TodoDraft) -> Result<Todo, TodoError>;
    /// Replaces description and priority only; `completed` is left alone.
    async fn update(&self, id: TodoId, draft: TodoDraft) -> Result<(), TodoError>;
    /// Deleting an absent id is not an error.
    async fn delete(&self, id: TodoId) -> Result<(), TodoError>;
    async fn close(&self) -> Result<(), TodoError>;
}

/// Empty and missing queries both mean "everything".
pub(crate) fn effective_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}
