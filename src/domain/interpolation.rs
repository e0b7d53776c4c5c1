// Point-in-time interpolation over a forecast time series
use super::observation::{LocationObservation, Observation, TimeSeries};
use chrono::{DateTime, TimeDelta, Utc};

/// Compute the observation for `location_id` at `when`.
///
/// - Before (or at) the first sample: the first sample's values.
/// - Between two samples: linear interpolation of every quantity.
/// - At or past the last sample: the last sample's values (clamped, no extrapolation).
///
/// The result is always timestamped `when`.
pub fn interpolate(series: &TimeSeries, location_id: &str, when: DateTime<Utc>) -> LocationObservation {
    let samples = series.samples();
    let first_after = samples.iter().position(|s| s.time > when);

    let values = match first_after {
        Some(0) => samples[0].clone(),
        Some(i) => blend(&samples[i - 1], &samples[i], when),
        // TimeSeries is never empty, so last() is always present here
        None => samples[samples.len() - 1].clone(),
    };

    LocationObservation {
        location_id: location_id.to_string(),
        observation: Observation { time: when, ..values },
    }
}

fn blend(first: &Observation, last: &Observation, when: DateTime<Utc>) -> Observation {
    // `first.time <= when < last.time`, so the span is never zero
    let factor = seconds(when - first.time) / seconds(last.time - first.time);
    let mix = |a: f64, b: f64| b * factor + a * (1.0 - factor);

    Observation {
        time: when,
        air_temperature: mix(first.air_temperature, last.air_temperature),
        air_pressure_at_sea_level: mix(first.air_pressure_at_sea_level, last.air_pressure_at_sea_level),
        relative_humidity: mix(first.relative_humidity, last.relative_humidity),
        wind_speed: mix(first.wind_speed, last.wind_speed),
        wind_from_direction: mix(first.wind_from_direction, last.wind_from_direction),
    }
}

fn seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
