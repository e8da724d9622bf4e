//! In-process record table shared by the local store backends.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::entities::{ClickEvent, LinkRecord};
use crate::domain::repositories::sort_most_recent_first;
use crate::error::AppError;

/// Records in commit order plus an index of the newest record per shortcode.
///
/// Superseded records stay in `records` for audit; they are always dead,
/// because a code is only reassigned once its owner has expired.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkTable {
    records: Vec<LinkRecord>,
    latest: HashMap<String, usize>,
}

impl LinkTable {
    /// Rebuilds the table from persisted records. Later entries win.
    pub(crate) fn from_records(records: Vec<LinkRecord>) -> Self {
        let latest = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.shortcode.clone(), idx))
            .collect();

        Self { records, latest }
    }

    pub(crate) fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub(crate) fn insert(&mut self, record: LinkRecord) -> Result<(), AppError> {
        if let Some(existing) = self.find(&record.shortcode)
            && existing.is_live_at(record.created_at)
        {
            return Err(AppError::DuplicateCode {
                code: record.shortcode,
            });
        }

        self.latest
            .insert(record.shortcode.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn find(&self, shortcode: &str) -> Option<&LinkRecord> {
        self.latest.get(shortcode).map(|&idx| &self.records[idx])
    }

    pub(crate) fn list_live(&self, now: DateTime<Utc>) -> Vec<LinkRecord> {
        let mut live: Vec<LinkRecord> = self
            .latest
            .values()
            .map(|&idx| &self.records[idx])
            .filter(|record| record.is_live_at(now))
            .cloned()
            .collect();

        sort_most_recent_first(&mut live);
        live
    }

    pub(crate) fn record_click(&mut self, shortcode: &str, event: ClickEvent) -> Result<(), AppError> {
        let idx = *self
            .latest
            .get(shortcode)
            .ok_or_else(|| AppError::NotFound {
                code: shortcode.to_string(),
            })?;

        self.records[idx].push_click(event);
        Ok(())
    }
}
