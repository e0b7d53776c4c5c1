// Sink that logs observations instead of storing them
use crate::application::observation_sink::ObservationSink;
use crate::domain::observation::LocationObservation;
use async_trait::async_trait;

/// Used when no time-series database is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl ObservationSink for LogSink {
    async fn send(&self, observation: &LocationObservation) -> anyhow::Result<()> {
        let json = serde_json::to_string(observation)?;
        tracing::info!("EMIT({}): {}", observation.location_id, json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::fixtures::*;

    #[tokio::test]
    async fn test_log_sink_accepts_observations() {
        let observation = LocationObservation {
            location_id: "skrindo".to_string(),
            observation: sample(at(0, 0), -5.0, 1023.3),
        };
        assert!(LogSink.send(&observation).await.is_ok());
    }
}
