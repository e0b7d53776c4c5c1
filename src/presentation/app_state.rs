// Application state for HTTP handlers
use crate::infrastructure::daemon_status::DaemonStatus;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub status: Arc<DaemonStatus>,
}
