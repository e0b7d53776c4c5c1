// Emitter - Interpolates current observations and forwards them downstream
use crate::application::observation_sink::ObservationSink;
use crate::application::status_reporter::StatusReporter;
use crate::application::time_series_query::TimeSeriesLookup;
use crate::domain::interpolation::interpolate;
use crate::domain::location::Location;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct EmitterSettings {
    /// How often the emitter wakes up to check whether an emission is due.
    pub tick: Duration,
    /// Minimum time between two emissions.
    pub emit_interval: Duration,
    /// Poll period of the startup readiness gate.
    pub readiness_poll: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    pub sent: usize,
    pub failed: usize,
    pub not_ready: usize,
}

pub struct Emitter {
    locations: Arc<[Location]>,
    lookup: Arc<dyn TimeSeriesLookup>,
    sink: Arc<dyn ObservationSink>,
    status: Arc<dyn StatusReporter>,
    settings: EmitterSettings,
    last_emitted: Option<DateTime<Utc>>,
}

impl Emitter {
    pub fn new(
        locations: Arc<[Location]>,
        lookup: Arc<dyn TimeSeriesLookup>,
        sink: Arc<dyn ObservationSink>,
        status: Arc<dyn StatusReporter>,
        settings: EmitterSettings,
    ) -> Self {
        Self {
            locations,
            lookup,
            sink,
            status,
            settings,
            last_emitted: None,
        }
    }

    /// Wait for data on every location, then emit on every due tick until `cancel` fires.
    ///
    /// Cancellation is honoured between locations and while a query is
    /// pending; a sink write that has started always completes.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Starting emitter, interval {:?}", self.settings.emit_interval);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Emitter stopped before data arrived");
                return;
            }
            _ = self.wait_until_ready() => {
                tracing::info!("Data available for all {} locations", self.locations.len());
            }
        }

        let mut ticker = time::interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let now = Utc::now();
                    if self.is_due(now) {
                        let s = self.emit_all(now, &cancel).await;
                        tracing::info!(
                            "Emit finished: {} sent, {} failed, {} without data",
                            s.sent,
                            s.failed,
                            s.not_ready
                        );
                    } else {
                        tracing::debug!("No emit due");
                    }
                }
            }
        }

        tracing::info!("Emitter stopped");
    }

    /// Resolve once every configured location has a series.
    pub async fn wait_until_ready(&self) {
        while !self.is_ready().await {
            tracing::debug!("Waiting for data...");
            time::sleep(self.settings.readiness_poll).await;
        }
    }

    async fn is_ready(&self) -> bool {
        for location in self.locations.iter() {
            if self.lookup.time_series(&location.id).await.is_none() {
                return false;
            }
        }
        true
    }

    /// True when nothing was emitted yet or the emit interval has elapsed since.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_emitted {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.settings.emit_interval),
        }
    }

    /// Interpolate every location at `now` and hand the results to the sink.
    ///
    /// Locations without data and sink failures are handled one by one and
    /// never abort the pass.
    pub async fn emit_all(&mut self, now: DateTime<Utc>, cancel: &CancellationToken) -> EmitSummary {
        let mut summary = EmitSummary::default();
        let locations = Arc::clone(&self.locations);

        for location in locations.iter() {
            if cancel.is_cancelled() {
                tracing::debug!("Emit interrupted by shutdown");
                break;
            }

            let lookup = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Emit interrupted by shutdown while querying {}", location.id);
                    break;
                }
                series = self.lookup.time_series(&location.id) => series,
            };
            let Some(series) = lookup else {
                tracing::warn!("No data yet for {}, skipping", location.id);
                summary.not_ready += 1;
                continue;
            };

            let observation = interpolate(&series, &location.id, now);
            match self.sink.send(&observation).await {
                Ok(()) => {
                    self.status.report_emit_success();
                    summary.sent += 1;
                }
                Err(e) => {
                    let message = format!("{}: {e:#}", location.id);
                    tracing::warn!("Failed to emit observation for {}", message);
                    self.status.report_emit_error(&message);
                    summary.failed += 1;
                }
            }
        }

        self.last_emitted = Some(now);
        summary
    }
}
