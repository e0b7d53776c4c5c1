// Presentation layer - Status HTTP endpoint
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{daemon_status, health_check};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn status_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(daemon_status))
        .route("/status", get(daemon_status))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
