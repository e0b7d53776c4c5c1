// Application layer - Cache, poller, emitter and their collaborator seams
pub mod emitter;
pub mod forecast_source;
pub mod lifecycle;
pub mod observation_cache;
pub mod observation_sink;
pub mod poller;
pub mod status_reporter;
pub mod time_series_query;

#[cfg(test)]
pub(crate) mod testing;
