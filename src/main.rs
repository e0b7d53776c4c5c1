// Main entry point - Dependency injection and task wiring
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::emitter::Emitter;
use crate::application::lifecycle::Lifecycle;
use crate::application::observation_cache::ObservationCache;
use crate::application::observation_sink::ObservationSink;
use crate::application::poller::Poller;
use crate::application::status_reporter::{NoopStatusReporter, StatusReporter};
use crate::application::time_series_query::query_channel;
use crate::domain::location::Location;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::daemon_status::DaemonStatus;
use crate::infrastructure::influx_sink::InfluxSink;
use crate::infrastructure::location_file::{load_locations, location_file_example};
use crate::infrastructure::log_sink::LogSink;
use crate::infrastructure::met_client::MetClient;
use crate::infrastructure::os_signals::wait_for_shutdown_signal;
use crate::presentation::app_state::AppState;
use crate::presentation::status_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_app_config()?;

    // Initialize tracing, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load locations, fatal if unusable
    let locations: Arc<[Location]> = match load_locations(&config.locations_file) {
        Ok(locations) => locations.into(),
        Err(e) => {
            tracing::error!("Could not parse location file: {}", e);
            tracing::error!("Example location file:\n{}", location_file_example());
            return Err(e).context("Aborting");
        }
    };
    for loc in locations.iter() {
        tracing::debug!("Polling location set: {} ({}, {})", loc.id, loc.lat, loc.long);
    }

    // Create collaborators (infrastructure layer)
    let source = Arc::new(MetClient::new(
        &config.api_url,
        &config.user_agent,
        config.fetch_timeout(),
    )?);

    let sink: Arc<dyn ObservationSink> = match &config.influx {
        Some(influx) => {
            tracing::info!("Writing observations to InfluxDB bucket {}", influx.bucket);
            Arc::new(InfluxSink::new(influx))
        }
        None => {
            tracing::warn!("No InfluxDB configured, observations will only be logged");
            Arc::new(LogSink)
        }
    };

    // Status endpoint, disabled by an empty bind address
    let daemon_status = if config.bind_address.is_empty() {
        None
    } else {
        Some(Arc::new(DaemonStatus::new(
            locations.iter().map(|l| l.id.as_str()),
        )))
    };
    let status: Arc<dyn StatusReporter> = match &daemon_status {
        Some(daemon_status) => daemon_status.clone(),
        None => Arc::new(NoopStatusReporter),
    };

    let server_cancel = CancellationToken::new();
    let server = match &daemon_status {
        Some(daemon_status) => {
            let router = status_router(Arc::new(AppState {
                status: daemon_status.clone(),
            }));
            let listener = tokio::net::TcpListener::bind(&config.bind_address)
                .await
                .with_context(|| format!("Failed to bind status server to {}", config.bind_address))?;
            tracing::info!("Starting status server on {}", config.bind_address);

            let cancel = server_cancel.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move { cancel.cancelled().await })
                    .await
            }))
        }
        None => None,
    };

    // Create poller and emitter (application layer)
    let (client, requests) = query_channel(config.query_buffer);
    let poller = Poller::new(
        locations.clone(),
        ObservationCache::new(),
        source,
        status.clone(),
        requests,
        config.poller_settings(),
    );
    let emitter = Emitter::new(
        locations,
        Arc::new(client),
        sink,
        status,
        config.emitter_settings(),
    );

    let lifecycle = Lifecycle::start(poller, emitter);
    tracing::info!("Daemon running");

    wait_for_shutdown_signal()
        .await
        .context("Failed to listen for shutdown signals")?;
    tracing::info!("Signal caught, winding down gracefully");
    if let Some(daemon_status) = &daemon_status {
        daemon_status.set_status("stopping");
    }

    let report = lifecycle.shutdown().await?;
    tracing::info!("Stopped in order: {}", report.stopped.join(", "));

    server_cancel.cancel();
    if let Some(server) = server {
        server
            .await
            .context("Status server task failed")?
            .context("Status server failed")?;
    }

    tracing::info!("End of program");
    Ok(())
}
