// Point queries for a location's current time series
use crate::domain::observation::TimeSeries;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Read access to the current series of a location. `None` means "no data yet".
#[async_trait]
pub trait TimeSeriesLookup: Send + Sync {
    async fn time_series(&self, location_id: &str) -> Option<Arc<TimeSeries>>;
}

/// A point query answered by the poller.
#[derive(Debug)]
pub struct TimeSeriesRequest {
    pub location_id: String,
    pub respond_to: oneshot::Sender<Option<Arc<TimeSeries>>>,
}

/// Sending half of the poller's query channel.
#[derive(Debug, Clone)]
pub struct TimeSeriesClient {
    requests: mpsc::Sender<TimeSeriesRequest>,
}

/// Create the query channel shared between the emitter and the poller.
pub fn query_channel(buffer: usize) -> (TimeSeriesClient, mpsc::Receiver<TimeSeriesRequest>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (TimeSeriesClient { requests: tx }, rx)
}

impl TimeSeriesClient {
    /// True once the poller has dropped its end of the channel.
    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }
}

#[async_trait]
impl TimeSeriesLookup for TimeSeriesClient {
    async fn time_series(&self, location_id: &str) -> Option<Arc<TimeSeries>> {
        if self.is_closed() {
            tracing::warn!("Poller is gone, no time series for {}", location_id);
            return None;
        }

        let (respond_to, response) = oneshot::channel();
        let request = TimeSeriesRequest {
            location_id: location_id.to_string(),
            respond_to,
        };

        if self.requests.send(request).await.is_err() {
            tracing::warn!("Poller is gone, no time series for {}", location_id);
            return None;
        }

        // A dropped responder means the poller stopped before answering
        response.await.ok().flatten()
    }
}
