// Shared in-memory cache of forecast time series, one per location
use crate::application::time_series_query::TimeSeriesLookup;
use crate::domain::observation::TimeSeries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Many-reader / single-writer store of the latest series per location.
///
/// Entries are replaced wholesale and handed out as `Arc` snapshots, so a
/// reader sees either the old or the new series for a location, never a mix.
/// Cloning the cache clones the handle, not the data.
#[derive(Clone, Default)]
pub struct ObservationCache {
    inner: Arc<RwLock<HashMap<String, Arc<TimeSeries>>>>,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, location_id: &str) -> Option<Arc<TimeSeries>> {
        self.inner.read().await.get(location_id).cloned()
    }

    /// Replace the series for `location_id`. Visible to every reader once this returns.
    pub async fn put(&self, location_id: impl Into<String>, series: TimeSeries) {
        let series = Arc::new(series);
        self.inner.write().await.insert(location_id.into(), series);
    }

    /// True when there is no series for `location_id` or it has expired at `now`.
    pub async fn is_stale(&self, location_id: &str, now: DateTime<Utc>) -> bool {
        self.inner
            .read()
            .await
            .get(location_id)
            .is_none_or(|series| series.is_expired(now))
    }
}

#[async_trait]
impl TimeSeriesLookup for ObservationCache {
    async fn time_series(&self, location_id: &str) -> Option<Arc<TimeSeries>> {
        self.get(location_id).await
    }
}
