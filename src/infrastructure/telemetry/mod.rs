//! Fire-and-forget log shipping.
//!
//! Provides a [`TelemetrySink`] trait with two implementations:
//! - [`ChannelTelemetry`] - Bounded queue drained by a [`TelemetryShipper`] task
//! - [`NullTelemetry`] - No collector configured; entries only reach `tracing`

mod channel_telemetry;
mod null_telemetry;
mod service;

pub use channel_telemetry::{ChannelTelemetry, TelemetryShipper};
pub use null_telemetry::NullTelemetry;
pub use service::{LogEntry, LogLevel, TelemetrySink, TelemetryStatus};
