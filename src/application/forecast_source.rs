// Source trait for forecast data
use crate::domain::location::Location;
use crate::domain::observation::TimeSeries;
use async_trait::async_trait;

#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch a fresh forecast for `location`, including the expiry the source
    /// advertises for it. The implementation owns its request timeout.
    async fn fetch(&self, location: &Location) -> anyhow::Result<TimeSeries>;
}
