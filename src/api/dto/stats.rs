//! DTOs for link statistics.

use serde::Serialize;

use crate::domain::entities::LinkSummary;

/// Live links with their usage, most recent first.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    pub items: Vec<LinkSummary>,
}
