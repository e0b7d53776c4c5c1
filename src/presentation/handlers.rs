// HTTP request handlers
use crate::infrastructure::daemon_status::StatusSnapshot;
use crate::presentation::app_state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Poll and emit counters for the whole daemon
pub async fn daemon_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.status.snapshot())
}
