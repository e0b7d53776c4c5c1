// Hand-written fakes for the application layer's collaborator traits
use crate::application::forecast_source::ForecastSource;
use crate::application::observation_sink::ObservationSink;
use crate::application::status_reporter::StatusReporter;
use crate::domain::location::Location;
use crate::domain::observation::{LocationObservation, Observation, TimeSeries};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Returns a two-sample series around "now" that expires in an hour.
#[derive(Default)]
pub struct FakeForecastSource {
    failures: Mutex<HashMap<String, usize>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl FakeForecastSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` fetches for `location_id` fail.
    pub fn fail_next(&self, location_id: &str, count: usize) {
        self.failures
            .lock()
            .unwrap()
            .insert(location_id.to_string(), count);
    }

    pub fn fetches(&self, location_id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(location_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ForecastSource for FakeForecastSource {
    async fn fetch(&self, location: &Location) -> anyhow::Result<TimeSeries> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(location.id.clone())
            .or_default() += 1;

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&location.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    anyhow::bail!("upstream unavailable for {}", location.id);
                }
            }
        }

        let now = Utc::now();
        let sample = |offset: i64, temperature: f64| Observation {
            time: now + Duration::minutes(offset),
            air_temperature: temperature,
            air_pressure_at_sea_level: 1000.0,
            relative_humidity: 50.0,
            wind_speed: 3.0,
            wind_from_direction: 180.0,
        };
        Ok(TimeSeries::new(
            vec![sample(-30, 0.0), sample(30, 10.0)],
            now + Duration::hours(1),
        )?)
    }
}

/// Serves one short-lived series per location, then hangs on every later fetch.
pub struct StallingForecastSource {
    lifetime: Duration,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StallingForecastSource {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            fetches: Mutex::default(),
        }
    }

    /// True once some fetch is hanging.
    pub fn is_stalled(&self) -> bool {
        self.fetches.lock().unwrap().values().any(|count| *count > 1)
    }
}

#[async_trait]
impl ForecastSource for StallingForecastSource {
    async fn fetch(&self, location: &Location) -> anyhow::Result<TimeSeries> {
        let count = {
            let mut fetches = self.fetches.lock().unwrap();
            let count = fetches.entry(location.id.clone()).or_default();
            *count += 1;
            *count
        };

        if count > 1 {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            anyhow::bail!("timed out fetching {}", location.id);
        }

        let now = Utc::now();
        let sample = |offset: i64, temperature: f64| Observation {
            time: now + Duration::minutes(offset),
            air_temperature: temperature,
            air_pressure_at_sea_level: 1000.0,
            relative_humidity: 50.0,
            wind_speed: 3.0,
            wind_from_direction: 180.0,
        };
        Ok(TimeSeries::new(
            vec![sample(-30, 0.0), sample(30, 10.0)],
            now + self.lifetime,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    PollSuccess(String),
    PollError(String, String),
    EmitSuccess,
    EmitError(String),
}

#[derive(Default)]
pub struct RecordingStatus {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatus {
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: StatusEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl StatusReporter for RecordingStatus {
    fn report_poll_success(&self, location_id: &str) {
        self.push(StatusEvent::PollSuccess(location_id.to_string()));
    }

    fn report_poll_error(&self, location_id: &str, message: &str) {
        self.push(StatusEvent::PollError(location_id.to_string(), message.to_string()));
    }

    fn report_emit_success(&self) {
        self.push(StatusEvent::EmitSuccess);
    }

    fn report_emit_error(&self, message: &str) {
        self.push(StatusEvent::EmitError(message.to_string()));
    }
}

/// Collects everything it is sent; refuses observations for `failing` ids.
#[derive(Default)]
pub struct RecordingSink {
    failing: HashSet<String>,
    sent: Mutex<Vec<LocationObservation>>,
}

impl RecordingSink {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<LocationObservation> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObservationSink for RecordingSink {
    async fn send(&self, observation: &LocationObservation) -> anyhow::Result<()> {
        if self.failing.contains(&observation.location_id) {
            anyhow::bail!("write rejected for {}", observation.location_id);
        }
        self.sent.lock().unwrap().push(observation.clone());
        Ok(())
    }
}
