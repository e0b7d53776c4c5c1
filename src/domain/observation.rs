// Observation and time series domain models
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One forecast sample. Quantities are passed through in provider units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub time: DateTime<Utc>,
    pub air_temperature: f64,
    pub air_pressure_at_sea_level: f64,
    pub relative_humidity: f64,
    pub wind_speed: f64,
    pub wind_from_direction: f64,
}

/// An observation for a specific location, as handed to the sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationObservation {
    pub location_id: String,
    #[serde(flatten)]
    pub observation: Observation,
}

#[derive(Debug, Error, PartialEq)]
pub enum TimeSeriesError {
    #[error("time series has no samples")]
    Empty,
    #[error("sample {index} is earlier than the sample before it")]
    OutOfOrder { index: usize },
}

/// Ordered forecast samples for one location plus the expiry advertised by
/// the source for the whole series.
///
/// Construction validates the series, so a `TimeSeries` is never empty and
/// its samples never go backwards in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Observation>,
    expires: DateTime<Utc>,
}

impl TimeSeries {
    pub fn new(samples: Vec<Observation>, expires: DateTime<Utc>) -> Result<Self, TimeSeriesError> {
        if samples.is_empty() {
            return Err(TimeSeriesError::Empty);
        }
        if let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
        {
            return Err(TimeSeriesError::OutOfOrder { index: index + 1 });
        }
        Ok(Self { samples, expires })
    }

    pub fn samples(&self) -> &[Observation] {
        &self.samples
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }
}
