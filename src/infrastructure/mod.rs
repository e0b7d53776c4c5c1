// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod daemon_status;
pub mod influx_sink;
pub mod location_file;
pub mod log_sink;
pub mod met_client;
pub mod os_signals;
