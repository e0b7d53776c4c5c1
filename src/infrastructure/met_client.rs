// MET Norway locationforecast client
use crate::application::forecast_source::ForecastSource;
use crate::domain::location::Location;
use crate::domain::observation::{Observation, TimeSeries};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{EXPIRES, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MetClient {
    api_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct MetForecast {
    properties: MetProperties,
}

#[derive(Debug, Deserialize)]
struct MetProperties {
    timeseries: Vec<MetTimestep>,
}

#[derive(Debug, Deserialize)]
struct MetTimestep {
    time: DateTime<Utc>,
    data: MetTimestepData,
}

#[derive(Debug, Deserialize)]
struct MetTimestepData {
    instant: MetInstant,
}

#[derive(Debug, Deserialize)]
struct MetInstant {
    details: MetDetails,
}

// Nowcast omits some of these, missing values come through as 0.0
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetDetails {
    air_temperature: f64,
    air_pressure_at_sea_level: f64,
    relative_humidity: f64,
    wind_speed: f64,
    wind_from_direction: f64,
}

impl MetClient {
    /// MET rejects requests without an identifying User-Agent.
    pub fn new(api_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for MET")?;

        Ok(Self {
            api_url: api_url.into(),
            http,
        })
    }
}

#[async_trait]
impl ForecastSource for MetClient {
    async fn fetch(&self, location: &Location) -> Result<TimeSeries> {
        // MET asks for at most four decimals on coordinates
        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("lat", format!("{:.4}", location.lat)),
                ("lon", format!("{:.4}", location.long)),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send forecast request for {}", location.id))?;

        let status = res.status();
        if status != StatusCode::OK && status != StatusCode::NON_AUTHORITATIVE_INFORMATION {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Forecast request for {} failed with status {}: {}",
                location.id,
                status,
                truncate_body(&body),
            ));
        }

        let expires = parse_expires(res.headers().get(EXPIRES))
            .with_context(|| format!("Bad Expires header for {}", location.id))?;

        let forecast = res
            .json::<MetForecast>()
            .await
            .with_context(|| format!("Failed to parse forecast JSON for {}", location.id))?;

        into_time_series(forecast, expires)
            .with_context(|| format!("Unusable forecast for {}", location.id))
    }
}

fn parse_expires(value: Option<&HeaderValue>) -> Result<DateTime<Utc>> {
    let value = value.ok_or_else(|| anyhow!("Expires header missing"))?;
    let text = value.to_str().context("Expires header is not ASCII")?;
    let expires = DateTime::parse_from_rfc2822(text)
        .with_context(|| format!("Expires header '{text}' is not an HTTP date"))?;
    Ok(expires.with_timezone(&Utc))
}

fn into_time_series(forecast: MetForecast, expires: DateTime<Utc>) -> Result<TimeSeries> {
    let samples = forecast
        .properties
        .timeseries
        .into_iter()
        .map(|step| {
            let details = step.data.instant.details;
            Observation {
                time: step.time,
                air_temperature: details.air_temperature,
                air_pressure_at_sea_level: details.air_pressure_at_sea_level,
                relative_humidity: details.relative_humidity,
                wind_speed: details.wind_speed,
                wind_from_direction: details.wind_from_direction,
            }
        })
        .collect();

    Ok(TimeSeries::new(samples, expires)?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
