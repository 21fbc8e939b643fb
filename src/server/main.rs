use std::sync::Arc;

use anyhow::Context;
use todo_app::adapters::http::shutdown_signal;
use todo_app::adapters::{HtmlViews, HttpServer};
use todo_app::config::ServerConfig;
use todo_app::core::TodoService;
use todo_app::storage::sqlite::SQLiteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = ServerConfig::from_env()?;
    // Nothing is served until the store is connected.
    let store = SQLiteStore::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("could not connect to {}", config.database_url))?;
    let todo_service = TodoService::new(Arc::new(store));

    let http_server = HttpServer::new(todo_service, Arc::new(HtmlViews), config.http()).await?;
    http_server.run(shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}
