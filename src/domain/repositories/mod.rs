//! Repository trait definitions for the domain layer.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - The record store behind shortening, redirects and statistics
//! - [`DraftRepository`] - Pending-form drafts
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are auto-generated via `mockall` for testing.

pub mod draft_repository;
pub mod link_repository;

pub use draft_repository::DraftRepository;
pub use link_repository::{LinkRepository, sort_most_recent_first};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
