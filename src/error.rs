use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use crate::submission::NOTICE;

#[derive(Debug)]
pub enum AppError {
    /// A required field was missing or empty.
    Validation,
    Io(std::io::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation => write!(f, "Validation failed: missing required field"),
            AppError::Io(err) => write!(f, "IO Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // The notice is the whole body, nothing machine-readable.
            AppError::Validation => (StatusCode::BAD_REQUEST, Html(NOTICE)).into_response(),
            AppError::Io(err) => {
                tracing::error!("Failed to write report: {err}");
                let body = json!({ "error": "Internal server error" });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}
