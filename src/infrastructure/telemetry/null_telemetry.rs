//! No-op telemetry sink for when no collector is configured.

use tracing::debug;

use super::service::{LogEntry, TelemetrySink, TelemetryStatus};

/// A sink that ships nothing.
///
/// Entries still reach the local `tracing` subscriber through
/// [`TelemetrySink::log`].
pub struct NullTelemetry {
    origin: String,
}

impl NullTelemetry {
    pub fn new(origin: impl Into<String>) -> Self {
        debug!("Using NullTelemetry (log shipping disabled)");
        Self {
            origin: origin.into(),
        }
    }
}

impl Default for NullTelemetry {
    fn default() -> Self {
        Self::new("backend")
    }
}

impl TelemetrySink for NullTelemetry {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn enqueue(&self, _entry: LogEntry) {}

    fn status(&self) -> TelemetryStatus {
        TelemetryStatus {
            enabled: false,
            queued: 0,
            capacity: 0,
            dropped: 0,
        }
    }
}
