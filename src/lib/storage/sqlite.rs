use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::core::{Todo, TodoDocument, TodoDraft, TodoError, TodoId};
use crate::storage::{effective_query, TodoStore, COLLECTION};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// Todo documents kept as JSON in a SQLite table named after the collection.
pub struct SQLiteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: String,
    document: String,
}

impl TryFrom<TodoRow> for Todo {
    type Error = TodoError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let id = TodoId::from_str(&row.id)
            .map_err(|_| TodoError::Store(format!("stored id {:?} is malformed", row.id)))?;
        let document: TodoDocument = serde_json::from_str(&row.document)?;
        Ok(document.into_todo(id))
    }
}

impl From<sqlx::Error> for TodoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => TodoError::NotReady,
            other => TodoError::Store(other.to_string()),
        }
    }
}

impl SQLiteStore {
    /// Opens the pool and makes sure the collection exists. `sqlite::memory:`
    /// databases are private to a connection, so callers should pass
    /// `max_connections = 1` for them.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, TodoError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {COLLECTION} (
                id TEXT PRIMARY KEY NOT NULL,
                document TEXT NOT NULL
            )"
        ))
        .execute(&pool)
        .await?;
        #[cfg(feature = "tracing")]
        info!(url = %url, collection = COLLECTION, "Connected to todo store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TodoStore for SQLiteStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Todo>, TodoError> {
        let rows: Vec<TodoRow> = match effective_query(query) {
            // instr() is case-sensitive and treats the needle literally, unlike LIKE
            Some(needle) => {
                sqlx::query_as(&format!(
                    "SELECT id, document FROM {COLLECTION}
                     WHERE instr(json_extract(document, '$.description'), ?1) > 0"
                ))
                .bind(needle)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT id, document FROM {COLLECTION}"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn get_by_id(&self, id: TodoId) -> Result<Todo, TodoError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "SELECT id, document FROM {COLLECTION} WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| TodoError::NotFound(id.to_string()))?
            .try_into()
    }

    async fn create(&self, draft: TodoDraft) -> Result<Todo, TodoError> {
        let id = TodoId::new();
        let document = TodoDocument::from(draft);
        sqlx::query(&format!(
            "INSERT INTO {COLLECTION} (id, document) VALUES (?1, ?2)"
        ))
        .bind(id.to_string())
        .bind(serde_json::to_string(&document)?)
        .execute(&self.pool)
        .await?;
        Ok(document.into_todo(id))
    }

    async fn update(&self, id: TodoId, draft: TodoDraft) -> Result<(), TodoError> {
        let result = sqlx::query(&format!(
            "UPDATE {COLLECTION}
             SET document = json_set(document, '$.description', ?1, '$.priority', ?2)
             WHERE id = ?3"
        ))
        .bind(draft.description)
        .bind(draft.priority)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), TodoError> {
        let _result = sqlx::query(&format!("DELETE FROM {COLLECTION} WHERE id = ?1"))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        #[cfg(feature = "tracing")]
        debug!(id = %id, removed = _result.rows_affected(), "Deleted todo");
        Ok(())
    }

    async fn close(&self) -> Result<(), TodoError> {
        if self.pool.is_closed() {
            return Err(TodoError::NotReady);
        }
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SQLiteStore {
        SQLiteStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn draft(description: &str, priority: i64) -> TodoDraft {
        TodoDraft {
            description: description.to_string(),
            priority,
        }
    }

    #[tokio::test]
    async fn create_then_search_all() {
        let store = store().await;
        let created = store.create(draft("buy milk", 3)).await.unwrap();
        assert!(!created.completed);

        let todos = store.search(None).await.unwrap();
        assert_eq!(todos, vec![created]);
    }

    #[tokio::test]
    async fn search_is_case_sensitive_substring() {
        let store = store().await;
        store.create(draft("Buy milk", 1)).await.unwrap();
        store.create(draft("buy bread", 2)).await.unwrap();
        store.create(draft("walk 100% of the dog_park", 3)).await.unwrap();

        let hits = store.search(Some("buy")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description, "buy bread");

        let hits = store.search(Some("%")).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search(Some("_")).await.unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(store.search(Some("")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_keeps_completed_flag() {
        let store = store().await;
        let created = store.create(draft("draft", 1)).await.unwrap();
        sqlx::query(&format!(
            "UPDATE {COLLECTION} SET document = json_set(document, '$.completed', json('true')) WHERE id = ?1"
        ))
        .bind(created.id.to_string())
        .execute(&store.pool)
        .await
        .unwrap();

        store.update(created.id, draft("final", 9)).await.unwrap();
        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.description, "final");
        assert_eq!(fetched.priority, 9);
        assert!(fetched.completed);
    }

    #[tokio::test]
    async fn update_after_delete_is_not_found() {
        let store = store().await;
        let created = store.create(draft("temp", 1)).await.unwrap();
        store.delete(created.id).await.unwrap();
        store.delete(created.id).await.unwrap();

        let err = store.update(created.id, draft("again", 2)).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));
        assert!(matches!(store.get_by_id(created.id).await, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn operations_after_close_are_not_ready() {
        let store = store().await;
        store.close().await.unwrap();
        assert!(matches!(store.search(None).await, Err(TodoError::NotReady)));
        assert!(matches!(store.close().await, Err(TodoError::NotReady)));
    }

    #[tokio::test]
    async fn malformed_document_surfaces_as_store_error() {
        let store = store().await;
        sqlx::query(&format!("INSERT INTO {COLLECTION} (id, document) VALUES (?1, 'nope')"))
            .bind(TodoId::new().to_string())
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(matches!(store.search(None).await, Err(TodoError::Store(_))));
    }
}
