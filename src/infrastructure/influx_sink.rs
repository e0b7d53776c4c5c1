// InfluxDB sink for emitted observations
use crate::application::observation_sink::ObservationSink;
use crate::domain::observation::LocationObservation;
use crate::infrastructure::config::InfluxSettings;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::stream;
use influxdb2::Client;
use influxdb2::models::DataPoint;

pub struct InfluxSink {
    client: Client,
    bucket: String,
    measurement: String,
}

impl InfluxSink {
    pub fn new(settings: &InfluxSettings) -> Self {
        let host = settings.host.trim_end_matches('/');
        Self {
            client: Client::new(host, &settings.org, &settings.token),
            bucket: settings.bucket.clone(),
            measurement: settings.measurement.clone(),
        }
    }
}

/// One point per observation, tagged with the location as `sensor`.
fn to_data_point(measurement: &str, observation: &LocationObservation) -> Result<DataPoint> {
    let obs = &observation.observation;
    let timestamp = obs
        .time
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("Timestamp {} is out of range for InfluxDB", obs.time))?;

    DataPoint::builder(measurement)
        .tag("sensor", observation.location_id.as_str())
        .field("air_temperature", obs.air_temperature)
        .field("air_pressure_at_sea_level", obs.air_pressure_at_sea_level)
        .field("relative_humidity", obs.relative_humidity)
        .field("wind_speed", obs.wind_speed)
        .field("wind_from_direction", obs.wind_from_direction)
        .timestamp(timestamp)
        .build()
        .context("Failed to build InfluxDB data point")
}

#[async_trait]
impl ObservationSink for InfluxSink {
    async fn send(&self, observation: &LocationObservation) -> Result<()> {
        let point = to_data_point(&self.measurement, observation)?;

        self.client
            .write(&self.bucket, stream::iter(vec![point]))
            .await
            .with_context(|| {
                format!(
                    "Failed to write observation for {} to InfluxDB",
                    observation.location_id
                )
            })?;

        tracing::debug!(
            "(influx) pushed observation for {} to bucket {}",
            observation.location_id,
            self.bucket
        );
        Ok(())
    }
}
