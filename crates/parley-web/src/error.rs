use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parley_core::ValidationError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request body is not usable: {0}")]
    InvalidBody(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream responded with status {0}")]
    UpstreamStatus(u16),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Validation(err) => {
                tracing::debug!(code = err.code(), "Rejected chat payload: {err}");
                let body = json!({ "error": err.to_string(), "code": err.code() });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            other => {
                tracing::error!(error = %other, "Chat request failed");
                let body = json!({ "error": "Internal Server Error" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
