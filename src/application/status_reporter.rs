// Status reporting trait for poller and emitter instrumentation

/// Fire-and-forget instrumentation. Implementations must not block.
pub trait StatusReporter: Send + Sync {
    fn report_poll_success(&self, location_id: &str);
    fn report_poll_error(&self, location_id: &str, message: &str);
    fn report_emit_success(&self);
    fn report_emit_error(&self, message: &str);
}

/// Reporter used when no status collaborator is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusReporter;

impl StatusReporter for NoopStatusReporter {
    fn report_poll_success(&self, _location_id: &str) {}
    fn report_poll_error(&self, _location_id: &str, _message: &str) {}
    fn report_emit_success(&self) {}
    fn report_emit_error(&self, _message: &str) {}
}
