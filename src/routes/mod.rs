pub mod ingest;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

/// `POST` stores a report and answers `200` with an empty body. A submission
/// missing a required field, or a plain `GET`, gets the fixed notice with
/// `400 Bad Request` (the notice text is the entire body).
pub fn ingest_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(ingest::notice).post(ingest::submit))
        .route("/submit", get(ingest::notice).post(ingest::submit))
}
