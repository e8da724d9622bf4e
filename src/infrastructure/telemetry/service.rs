//! Telemetry sink trait and log entry types.

use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Severity of a telemetry entry, serialized in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// One shipped log line.
///
/// Serialized as `{ stack, level, package, message }`, the shape the log
/// collector expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "stack")]
    pub origin: String,
    pub level: LogLevel,
    #[serde(rename = "package")]
    pub component: String,
    pub message: String,
}

/// Queue state reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryStatus {
    pub enabled: bool,
    pub queued: usize,
    pub capacity: usize,
    pub dropped: u64,
}

/// Fire-and-forget sink for structured log entries.
///
/// Callers never wait on delivery and never observe its failure.
///
/// # Implementations
///
/// - [`crate::infrastructure::telemetry::ChannelTelemetry`] - Bounded queue drained by a shipper task
/// - [`crate::infrastructure::telemetry::NullTelemetry`] - Local `tracing` output only
pub trait TelemetrySink: Send + Sync {
    /// Value of the `stack` field for entries produced by this sink.
    fn origin(&self) -> &str;

    /// Hands an entry to the transport. Must not block.
    fn enqueue(&self, entry: LogEntry);

    fn status(&self) -> TelemetryStatus;

    /// Emits the entry as a `tracing` event and enqueues it for shipping.
    fn log(&self, level: LogLevel, component: &str, message: String) {
        let entry = LogEntry {
            origin: self.origin().to_string(),
            level,
            component: component.to_string(),
            message,
        };
        trace_entry(&entry);
        self.enqueue(entry);
    }
}

fn trace_entry(entry: &LogEntry) {
    let component = entry.component.as_str();
    let message = entry.message.as_str();

    match entry.level {
        LogLevel::Debug => debug!(target: "telemetry", component, "{message}"),
        LogLevel::Info => info!(target: "telemetry", component, "{message}"),
        LogLevel::Warn => warn!(target: "telemetry", component, "{message}"),
        LogLevel::Error | LogLevel::Fatal => {
            error!(target: "telemetry", component, level = ?entry.level, "{message}")
        }
    }
}
