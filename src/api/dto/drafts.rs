//! DTOs for pending-form drafts.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortenRequest;

/// The whole draft collection, read and replaced at once.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct DraftsPayload {
    #[validate(length(max = 5, message = "At most 5 drafts are kept"))]
    pub drafts: Vec<ShortenRequest>,
}
