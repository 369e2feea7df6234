pub mod config;
pub mod error;
pub mod state;
pub mod notify;
pub mod routes;
pub mod storage;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::notify::NotifierRegistry;
use crate::state::{AppState, SharedState};
use crate::storage::ReportStore;

/// Builds the router with the system clock, random suffixes and whichever
/// notifiers the config enables.
pub fn build_app(config: Config) -> Router {
    let store = ReportStore::new(config.traces_dir.clone());
    let notifiers = NotifierRegistry::from_config(&config.notify);
    build_app_with(&config, store, notifiers)
}

/// Same as [`build_app`] with caller-supplied collaborators. Keep a clone of
/// `notifiers` to drain in-flight notifications on shutdown.
pub fn build_app_with(config: &Config, store: ReportStore, notifiers: NotifierRegistry) -> Router {
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState { store, notifiers });

    Router::new()
        .merge(routes::ingest_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
