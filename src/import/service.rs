//! Import service: projection, batching and the transactional write for one
//! request.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::db::Database;
use crate::{DiskError, Result};

use super::chunker::{ImportLimits, IntoBatches};
use super::projector::RowProjector;
use super::types::ImportItem;
use super::writer::{ImportWriter, WriteSummary};

/// Result of a committed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of submitted items.
    pub items: usize,
    /// Rows and statements per table.
    pub written: WriteSummary,
}

/// Service for bulk imports.
pub struct ImportService<'a> {
    db: &'a Database,
    limits: ImportLimits,
}

impl<'a> ImportService<'a> {
    /// Create a new ImportService with precomputed batch limits.
    pub fn new(db: &'a Database, limits: ImportLimits) -> Self {
        Self { db, limits }
    }

    /// Store `items` imported at `update_date`, all or nothing.
    ///
    /// Ids must be unique within one import; a repeat is rejected before
    /// the store is touched. Store-side constraint failures are returned as
    /// [`DiskError::Conflict`] or [`DiskError::Integrity`].
    pub async fn import(&self, items: &[ImportItem], update_date: NaiveDate) -> Result<ImportSummary> {
        if let Some(id) = first_duplicate_id(items) {
            warn!(id, "Rejecting import with repeated id");
            return Err(DiskError::Validation(format!(
                "id {} appears more than once",
                id
            )));
        }

        let projector = RowProjector::new(items, update_date);
        info!(items = projector.len(), %update_date, "Starting import");

        let writer = ImportWriter::new(self.db.pool());
        let written = writer
            .write(
                projector.aggregate_rows().batches(self.limits.aggregates),
                projector.node_rows().batches(self.limits.nodes),
                projector.history_rows().batches(self.limits.history),
            )
            .await?;

        info!(
            items = projector.len(),
            aggregates = written.aggregates.rows,
            statements = written.aggregates.batches + written.nodes.batches + written.history.batches,
            "Import committed"
        );

        Ok(ImportSummary {
            items: projector.len(),
            written,
        })
    }
}

fn first_duplicate_id(items: &[ImportItem]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .map(|item| item.id.as_str())
        .find(|id| !seen.insert(*id))
}
