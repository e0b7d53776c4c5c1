// Sink trait for emitted observations
use crate::domain::observation::LocationObservation;
use async_trait::async_trait;

#[async_trait]
pub trait ObservationSink: Send + Sync {
    async fn send(&self, observation: &LocationObservation) -> anyhow::Result<()>;
}
