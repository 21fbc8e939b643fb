use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{Todo, TodoDocument, TodoDraft, TodoError, TodoId};
use crate::storage::{effective_query, TodoStore};

/// In-process collection with the same semantics as the SQLite store.
/// Todos are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a todo as-is, keeping its id and completed flag.
    pub async fn insert(&self, todo: Todo) -> Result<(), TodoError> {
        self.ensure_open()?;
        self.todos.write().await.push(todo);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), TodoError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TodoError::NotReady);
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Todo>, TodoError> {
        self.ensure_open()?;
        let todos = self.todos.read().await;
        Ok(match effective_query(query) {
            Some(needle) => todos
                .iter()
                .filter(|todo| todo.description.contains(needle))
                .cloned()
                .collect(),
            None => todos.clone(),
        })
    }

    async fn get_by_id(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.ensure_open()?;
        self.todos
            .read()
            .await
            .iter()
            .find(|todo| todo.id == id)
            .cloned()
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    async fn create(&self, draft: TodoDraft) -> Result<Todo, TodoError> {
        self.ensure_open()?;
        let todo = TodoDocument::from(draft).into_todo(TodoId::new());
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, draft: TodoDraft) -> Result<(), TodoError> {
        self.ensure_open()?;
        let mut todos = self.todos.write().await;
        let todo = todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        todo.description = draft.description;
        todo.priority = draft.priority;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), TodoError> {
        self.ensure_open()?;
        self.todos.write().await.retain(|todo| todo.id != id);
        Ok(())
    }

    async fn close(&self) -> Result<(), TodoError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(TodoError::NotReady);
        }
        Ok(())
    }
}
