// In-memory daemon status, fed by the poller and emitter
use crate::application::status_reporter::StatusReporter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollerStatus {
    pub last_poll: Option<DateTime<Utc>>,
    pub no_of_polls: u64,
    pub no_of_poll_errors: u64,
    pub last_poll_error_message: Option<String>,
    pub last_poll_error_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmitterStatus {
    pub last_emit: Option<DateTime<Utc>>,
    pub no_of_emits: u64,
    pub no_of_emit_errors: u64,
    pub last_emit_error_message: Option<String>,
    pub last_emit_error_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub running_since: DateTime<Utc>,
    pub locations: BTreeMap<String, PollerStatus>,
    pub emitter: EmitterStatus,
}

pub struct DaemonStatus {
    inner: Mutex<StatusSnapshot>,
}

impl DaemonStatus {
    pub fn new<'a>(location_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let locations = location_ids
            .into_iter()
            .map(|id| (id.to_string(), PollerStatus::default()))
            .collect();

        Self {
            inner: Mutex::new(StatusSnapshot {
                status: "running".to_string(),
                running_since: Utc::now(),
                locations,
                emitter: EmitterStatus::default(),
            }),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().clone()
    }

    pub fn set_status(&self, status: &str) {
        self.lock().status = status.to_string();
    }

    // Counters stay usable even if a holder panicked
    fn lock(&self) -> MutexGuard<'_, StatusSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusReporter for DaemonStatus {
    fn report_poll_success(&self, location_id: &str) {
        let mut state = self.lock();
        let poller = state.locations.entry(location_id.to_string()).or_default();
        poller.last_poll = Some(Utc::now());
        poller.no_of_polls += 1;
    }

    fn report_poll_error(&self, location_id: &str, message: &str) {
        let mut state = self.lock();
        let poller = state.locations.entry(location_id.to_string()).or_default();
        poller.last_poll_error_time = Some(Utc::now());
        poller.last_poll_error_message = Some(message.to_string());
        poller.no_of_poll_errors += 1;
    }

    fn report_emit_success(&self) {
        let mut state = self.lock();
        state.emitter.last_emit = Some(Utc::now());
        state.emitter.no_of_emits += 1;
    }

    fn report_emit_error(&self, message: &str) {
        let mut state = self.lock();
        state.emitter.last_emit_error_time = Some(Utc::now());
        state.emitter.last_emit_error_message = Some(message.to_string());
        state.emitter.no_of_emit_errors += 1;
    }
}
