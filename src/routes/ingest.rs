use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline, RawSubmission};

pub async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    // Media types are case-insensitive.
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase);

    let parsed = if content_type.as_deref().is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type.as_deref(), &body)
    };

    // An unreadable body carries no usable fields.
    let raw = parsed.unwrap_or_else(|e| {
        tracing::debug!("Could not decode submission body: {e}");
        RawSubmission::default()
    });

    pipeline::run(&state, raw).await?;

    Ok(StatusCode::OK)
}

/// A plain visit carries no fields, so it always gets the notice.
pub async fn notice() -> AppError {
    AppError::Validation
}
