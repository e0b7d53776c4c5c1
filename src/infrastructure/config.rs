use crate::application::emitter::EmitterSettings;
use crate::application::poller::PollerSettings;
use serde::Deserialize;
use std::time::Duration;

pub const CONFIG_FILE: &str = "config/yr-poller";
pub const DEFAULT_API_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub locations_file: String,
    pub poll_interval_secs: u64,
    pub poll_retry_backoff_secs: u64,
    pub emit_interval_secs: u64,
    pub emit_check_interval_secs: u64,
    pub readiness_poll_millis: u64,
    pub query_buffer: usize,
    pub bind_address: String,
    pub log_level: String,
    #[serde(default)]
    pub influx: Option<InfluxSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub org: String,
    pub token: String,
    pub bucket: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

fn default_measurement() -> String {
    "weather".to_string()
}

impl AppConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            tick: Duration::from_secs(self.poll_interval_secs.max(1)),
            retry_backoff: Duration::from_secs(self.poll_retry_backoff_secs),
        }
    }

    pub fn emitter_settings(&self) -> EmitterSettings {
        EmitterSettings {
            tick: Duration::from_secs(self.emit_check_interval_secs.max(1)),
            emit_interval: Duration::from_secs(self.emit_interval_secs),
            readiness_poll: Duration::from_millis(self.readiness_poll_millis.max(1)),
        }
    }
}

/// Defaults, then `config/yr-poller.*` if present, then `YRPOLLER__*` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(CONFIG_FILE)
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("api_url", DEFAULT_API_URL)?
        .set_default("user_agent", "yr-poller")?
        .set_default("fetch_timeout_secs", 20)?
        .set_default("locations_file", "locations.json")?
        .set_default("poll_interval_secs", 5)?
        .set_default("poll_retry_backoff_secs", 30)?
        .set_default("emit_interval_secs", 600)?
        .set_default("emit_check_interval_secs", 10)?
        .set_default("readiness_poll_millis", 100)?
        .set_default("query_buffer", 32)?
        .set_default("bind_address", "0.0.0.0:8080")?
        .set_default("log_level", "info")?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("YRPOLLER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
