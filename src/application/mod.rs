//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Validation, code allocation and link creation
//! - [`services::stats_service::StatsService`] - Per-link usage summaries
//! - [`services::redirect_service::RedirectService`] - Shortcode resolution and click recording

pub mod services;
