//! # Shortlink
//!
//! A URL shortener with expiring shortcodes, click statistics and pluggable
//! record stores, built with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Link records, click events and store traits
//! - **Application Layer** ([`application`]) - Shortening, statistics and redirects
//! - **Infrastructure Layer** ([`infrastructure`]) - Memory/file/remote stores and log shipping
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Random or preferred shortcodes, reusable once their link expires
//! - Per-link validity (30 minutes unless configured otherwise)
//! - Click log with source and location for every successful redirect
//! - In-memory, JSON-file or remote HTTP record store
//! - Fire-and-forget telemetry shipping with bounded buffering
//!
//! ## Quick Start
//!
//! ```bash
//! export STORE_BACKEND="file"
//! export STORE_PATH="./data"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkService, RedirectService, StatsService};
    pub use crate::domain::entities::{ClickEvent, ClickMetadata, LinkRecord, LinkSummary, ShortenRequest};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
