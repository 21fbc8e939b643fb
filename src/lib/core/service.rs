use std::sync::Arc;

use crate::core::{Todo, TodoDraft, TodoError, TodoId};
use crate::storage::TodoStore;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

/// Todo operations over raw request values. Identifiers and priorities are
/// parsed here so a malformed value never reaches the store.
pub struct TodoService<S: TodoStore> {
    store: Arc<S>,
}

impl<S: TodoStore> Clone for TodoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.search(query).await?;
        #[cfg(feature = "tracing")]
        debug!(count = todos.len(), "Search finished");
        Ok(todos)
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn get_by_id(&self, id: &str) -> Result<Todo, TodoError> {
        let id: TodoId = id.parse()?;
        self.store.get_by_id(id).await
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn create(&self, description: &str, priority_raw: &str) -> Result<Todo, TodoError> {
        let draft = TodoDraft::parse(description, priority_raw)?;
        let todo = self.store.create(draft).await?;
        #[cfg(feature = "tracing")]
        debug!(id = %todo.id, "Created todo");
        Ok(todo)
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn update(
        &self,
        id: &str,
        description: &str,
        priority_raw: &str,
    ) -> Result<(), TodoError> {
        let id: TodoId = id.parse()?;
        let draft = TodoDraft::parse(description, priority_raw)?;
        self.store.update(id, draft).await
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let id: TodoId = id.parse()?;
        self.store.delete(id).await
    }

    pub async fn close(&self) -> Result<(), TodoError> {
        self.store.close().await
    }
}
