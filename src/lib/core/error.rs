use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Store error: {0}")]
    Store(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Todo {0} not found")]
    NotFound(String),
    #[error("Store is not ready, try again later")]
    NotReady,
}

impl TodoError {
    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TodoError::InvalidId(_) | TodoError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::Store(format!("malformed document: {err}"))
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
