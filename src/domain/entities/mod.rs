//! Core domain entities representing the shortlink data model.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A committed shortcode → URL mapping with its click history
//! - [`ClickEvent`] - A single successful resolution of a shortcode
//! - [`ShortenRequest`] - One submission (also the persisted draft shape)
//!
//! Records are owned by the record store; services only propose values.

pub mod click;
pub mod link;
pub mod shorten_request;

pub use click::{ClickEvent, ClickMetadata};
pub use link::LinkRecord;
pub use shorten_request::ShortenRequest;

/// Per-link usage summary shown by the statistics view.
///
/// Same wire shape as a [`LinkRecord`].
pub type LinkSummary = LinkRecord;
