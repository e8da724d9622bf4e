//! Domain layer containing the shortlink entities and store contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures (link records, click events, requests)
//! - [`repositories`] - Store trait definitions
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Click Flow
//!
//! 1. HTTP handler receives a redirect request and captures [`entities::ClickMetadata`]
//! 2. [`crate::application::services::RedirectService`] checks liveness
//! 3. On success the click is appended via [`repositories::LinkRepository::record_click`]

pub mod entities;
pub mod repositories;
