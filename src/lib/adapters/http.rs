use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Router, ServiceExt,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::Layer;

use crate::adapters::method_override::{MethodOverride, MethodOverrideLayer};
use crate::adapters::views::Views;
use crate::core::{TodoError, TodoService};
use crate::storage::TodoStore;

#[cfg(feature = "tracing")]
use tracing::{info, warn};

pub const LIST_ROUTE: &str = "/todos";

pub struct AppState<S: TodoStore> {
    pub todo_service: TodoService<S>,
    pub views: Arc<dyn Views>,
}

impl<S: TodoStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            todo_service: self.todo_service.clone(),
            views: Arc::clone(&self.views),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Fields submitted by the create and edit forms, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct TodoForm {
    #[serde(alias = "desc")]
    pub description: Option<String>,
    pub priority: Option<String>,
}

impl TodoForm {
    /// Both fields must be present; the priority is coerced later.
    pub fn into_fields(self) -> Result<(String, String), TodoError> {
        let description = self
            .description
            .ok_or_else(|| TodoError::InvalidInput("description is required".into()))?;
        let priority = self
            .priority
            .ok_or_else(|| TodoError::InvalidInput("priority is required".into()))?;
        Ok((description, priority))
    }
}

async fn root() -> Redirect {
    Redirect::to(LIST_ROUTE)
}

async fn list_todos<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, TodoError> {
    let query = params.query.as_deref();
    let todos = state.todo_service.search(query).await?;
    Ok(Html(state.views.index(&todos, query)))
}

async fn new_todo<S: TodoStore + 'static>(State(state): State<AppState<S>>) -> Html<String> {
    Html(state.views.new_form())
}

async fn create_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Form(form): Form<TodoForm>,
) -> Result<Redirect, TodoError> {
    let (description, priority) = form.into_fields()?;
    state.todo_service.create(&description, &priority).await?;
    Ok(Redirect::to(LIST_ROUTE))
}

async fn edit_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Html<String>, TodoError> {
    let todo = match state.todo_service.get_by_id(&id).await {
        Ok(todo) => Some(todo),
        // the edit page degrades instead of failing on a bad or unknown id
        Err(TodoError::InvalidId(_) | TodoError::NotFound(_)) => None,
        Err(err) => return Err(err),
    };
    Ok(Html(state.views.edit(todo.as_ref())))
}

async fn update_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Form(form): Form<TodoForm>,
) -> Result<Redirect, TodoError> {
    let (description, priority) = form.into_fields()?;
    state
        .todo_service
        .update(&id, &description, &priority)
        .await?;
    Ok(Redirect::to(LIST_ROUTE))
}

async fn delete_todo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Redirect, TodoError> {
    state.todo_service.delete(&id).await?;
    Ok(Redirect::to(LIST_ROUTE))
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Routes only; expects the method already resolved.
pub fn router<S: TodoStore + 'static>(state: AppState<S>) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_route))
        .route(
            LIST_ROUTE,
            get(list_todos::<S>).post(create_todo::<S>),
        )
        .route("/todos/new", get(new_todo::<S>))
        .route("/todos/{id}/edit", get(edit_todo::<S>))
        .route(
            "/todos/{id}",
            axum::routing::put(update_todo::<S>)
                .patch(update_todo::<S>)
                .delete(delete_todo::<S>),
        );

    #[cfg(feature = "tracing")]
    let router = router.layer(tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        },
    ));

    router.with_state(state)
}

/// The full application: method override in front of the router.
pub fn app<S: TodoStore + 'static>(state: AppState<S>) -> MethodOverride<Router> {
    MethodOverrideLayer.layer(router(state))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

pub struct HttpServer<S: TodoStore + 'static> {
    state: AppState<S>,
    listener: TcpListener,
}

impl<S: TodoStore + 'static> HttpServer<S> {
    /// Binds the listener. The store inside `todo_service` must already be
    /// connected; nothing is served until `run`.
    pub async fn new(
        todo_service: TodoService<S>,
        views: Arc<dyn Views>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to listen on {addr}"))?;
        Ok(Self {
            state: AppState {
                todo_service,
                views,
            },
            listener,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Serves until `shutdown` resolves, drains in-flight requests, then
    /// closes the store. The close is attempted even when serving failed;
    /// a failed close is logged, never returned.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        #[cfg(feature = "tracing")]
        {
            let addr = self.local_addr()?;
            info!(addr = %addr, "Todo server listening");
        }
        let service = self.state.todo_service.clone();
        let application = app(self.state);
        let served = axum::serve(
            self.listener,
            ServiceExt::<axum::extract::Request>::into_make_service(application),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .context("received error from running server");

        #[cfg(feature = "tracing")]
        info!("Shutting down gracefully, closing todo store");
        match service.close().await {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                info!("Todo store closed");
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_err, "Failed to close todo store");
            }
        }
        served
    }
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C elsewhere).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
