// Poller - Keeps the observation cache fresh and answers point queries
use crate::application::forecast_source::ForecastSource;
use crate::application::observation_cache::ObservationCache;
use crate::application::status_reporter::StatusReporter;
use crate::application::time_series_query::TimeSeriesRequest;
use crate::domain::location::Location;
use crate::domain::observation::TimeSeries;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub tick: Duration,
    /// Fixed delay before a location whose fetch failed is tried again.
    pub retry_backoff: Duration,
}

/// What one refresh pass did, per location outcome.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollSummary {
    pub refreshed: usize,
    pub failed: usize,
    pub fresh: usize,
    pub backing_off: usize,
}

pub struct Poller {
    locations: Arc<[Location]>,
    cache: ObservationCache,
    source: Arc<dyn ForecastSource>,
    status: Arc<dyn StatusReporter>,
    requests: mpsc::Receiver<TimeSeriesRequest>,
    settings: PollerSettings,
    retry_after: HashMap<String, Instant>,
}

impl Poller {
    pub fn new(
        locations: Arc<[Location]>,
        cache: ObservationCache,
        source: Arc<dyn ForecastSource>,
        status: Arc<dyn StatusReporter>,
        requests: mpsc::Receiver<TimeSeriesRequest>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            locations,
            cache,
            source,
            status,
            requests,
            settings,
            retry_after: HashMap::new(),
        }
    }

    /// Run until `cancel` fires. The first refresh happens immediately.
    ///
    /// Queries are answered between ticks and while a fetch is pending.
    /// Cancellation abandons a pending fetch; a cache write that has started
    /// always completes.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            "Starting poller for {} locations, tick every {:?}",
            self.locations.len(),
            self.settings.tick
        );

        let mut ticker = time::interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(request) = self.requests.recv() => self.answer(request).await,
                _ = ticker.tick() => {
                    let s = self.refresh(Utc::now(), &cancel).await;
                    tracing::debug!(
                        "Poll pass finished: {} refreshed, {} failed, {} fresh, {} backing off",
                        s.refreshed,
                        s.failed,
                        s.fresh,
                        s.backing_off
                    );
                }
            }
        }

        tracing::info!("Poller stopped");
    }

    async fn answer(&self, request: TimeSeriesRequest) {
        let series = self.cache.get(&request.location_id).await;
        if request.respond_to.send(series).is_err() {
            tracing::debug!(
                "Query for {} was abandoned before it was answered",
                request.location_id
            );
        }
    }

    /// One pass over every location: refetch whatever is stale and not backing off.
    ///
    /// A failed fetch leaves the old series in place and is never fatal.
    pub async fn refresh(&mut self, now: DateTime<Utc>, cancel: &CancellationToken) -> PollSummary {
        let mut summary = PollSummary::default();
        let locations = Arc::clone(&self.locations);

        for location in locations.iter() {
            if cancel.is_cancelled() {
                tracing::debug!("Refresh interrupted by shutdown");
                break;
            }

            if !self.cache.is_stale(&location.id, now).await {
                tracing::debug!("Current data for {} is up to date", location.id);
                summary.fresh += 1;
                continue;
            }

            let backing_off = self
                .retry_after
                .get(&location.id)
                .is_some_and(|retry_at| Instant::now() < *retry_at);
            if backing_off {
                tracing::debug!("Backing off {} after a failed fetch", location.id);
                summary.backing_off += 1;
                continue;
            }

            tracing::debug!("Invalid or no data found for {} - refreshing", location.id);
            let Some(result) = self.fetch_serving_queries(location, cancel).await else {
                tracing::debug!("Fetch for {} abandoned by shutdown", location.id);
                break;
            };
            match result {
                Ok(series) => {
                    tracing::debug!(
                        "Got {} samples for {}, expires {}",
                        series.samples().len(),
                        location.id,
                        series.expires()
                    );
                    self.cache.put(location.id.clone(), series).await;
                    self.retry_after.remove(&location.id);
                    self.status.report_poll_success(&location.id);
                    summary.refreshed += 1;
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    tracing::warn!("Failed to fetch forecast for {}: {}", location.id, message);
                    self.retry_after
                        .insert(location.id.clone(), Instant::now() + self.settings.retry_backoff);
                    self.status.report_poll_error(&location.id, &message);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Fetch one location while still answering point queries.
    ///
    /// Returns `None` if `cancel` fires before the fetch completes; the cache
    /// has not been touched at that point.
    async fn fetch_serving_queries(
        &mut self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Option<anyhow::Result<TimeSeries>> {
        let source = Arc::clone(&self.source);
        let mut fetch = source.fetch(location);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                Some(request) = self.requests.recv() => self.answer(request).await,
                result = &mut fetch => return Some(result),
            }
        }
    }
}
