//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization; payload shape
//! limits are checked with validator. Per-link rules (URL syntax, shortcode
//! format, validity) are enforced by the services, not here.

pub mod drafts;
pub mod health;
pub mod shorten;
pub mod stats;
pub mod urls;
