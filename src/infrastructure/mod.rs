//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete record stores and the telemetry transport.
//!
//! # Modules
//!
//! - [`persistence`] - Memory, file and remote store implementations
//! - [`telemetry`] - Log shipping (channel-backed and no-op sinks)

pub mod persistence;
pub mod telemetry;
