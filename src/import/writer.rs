//! Transactional writer for chunked import rows.
//!
//! All batches of one import run inside a single transaction, in the order
//! aggregates, nodes, history. The first failing batch aborts the import
//! and rolls everything back. The transaction guard also rolls back when
//! the future is dropped mid-write (e.g. the client disconnected).

use std::fmt;

use sqlx::{QueryBuilder, Transaction};
use tracing::{debug, warn};

use crate::db::{Db, DbPool, TableSpec, AGGREGATES_TABLE, HISTORY_TABLE, NODES_TABLE};
use crate::{DiskError, Result};

use super::types::{AggregateRow, HistoryRow, InsertRow, NodeRow};

/// Progress of one import transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Transaction opened, nothing written yet.
    Begun,
    /// Inserting aggregate batches.
    WritingAggregates,
    /// Inserting node batches.
    WritingNodes,
    /// Inserting history batches.
    WritingHistory,
    /// All batches committed.
    Committed,
    /// Transaction rolled back; nothing from this import is visible.
    RolledBack,
}

impl WriteStage {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WriteStage::Committed | WriteStage::RolledBack)
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteStage::Begun => "begun",
            WriteStage::WritingAggregates => "writing-aggregates",
            WriteStage::WritingNodes => "writing-nodes",
            WriteStage::WritingHistory => "writing-history",
            WriteStage::Committed => "committed",
            WriteStage::RolledBack => "rolled-back",
        };
        f.write_str(name)
    }
}

/// Rows and statements written to one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableWrite {
    pub rows: usize,
    pub batches: usize,
}

/// Outcome of a committed import transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub aggregates: TableWrite,
    pub nodes: TableWrite,
    pub history: TableWrite,
}

/// Writes chunked import rows inside one transaction.
pub struct ImportWriter<'a> {
    pool: &'a DbPool,
    aggregates_table: TableSpec,
    nodes_table: TableSpec,
    history_table: TableSpec,
}

impl<'a> ImportWriter<'a> {
    /// Create a writer targeting the default tables.
    pub fn new(pool: &'a DbPool) -> Self {
        Self::with_tables(pool, AGGREGATES_TABLE, NODES_TABLE, HISTORY_TABLE)
    }

    /// Create a writer targeting the given tables.
    pub fn with_tables(
        pool: &'a DbPool,
        aggregates_table: TableSpec,
        nodes_table: TableSpec,
        history_table: TableSpec,
    ) -> Self {
        Self {
            pool,
            aggregates_table,
            nodes_table,
            history_table,
        }
    }

    /// Write every batch of the three streams, then commit.
    ///
    /// On any failure the transaction is rolled back and the first error is
    /// returned. No retries are attempted.
    pub async fn write<A, N, H>(&self, aggregates: A, nodes: N, history: H) -> Result<WriteSummary>
    where
        A: Iterator<Item = Vec<AggregateRow>> + Send,
        N: Iterator<Item = Vec<NodeRow>> + Send,
        H: Iterator<Item = Vec<HistoryRow>> + Send,
    {
        let mut tx = self.pool.begin().await?;
        let mut stage = WriteStage::Begun;
        debug!(stage = %stage, "Import transaction opened");

        let written = self
            .write_all(&mut tx, &mut stage, aggregates, nodes, history)
            .await;

        let summary = match written {
            Ok(summary) => summary,
            Err(e) => {
                warn!(stage = %stage, error = %e, "Import batch failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    // The guard is gone; the server discards the transaction
                    // when the connection is closed or reused.
                    warn!(error = %rollback_err, "Explicit rollback failed");
                }
                stage = WriteStage::RolledBack;
                debug!(stage = %stage, "Import transaction closed");
                return Err(e);
            }
        };

        // Deferred foreign keys are checked here.
        if let Err(e) = tx.commit().await {
            let e = DiskError::from(e);
            stage = WriteStage::RolledBack;
            warn!(stage = %stage, error = %e, "Import commit failed");
            return Err(e);
        }

        stage = WriteStage::Committed;
        debug!(stage = %stage, "Import transaction closed");
        Ok(summary)
    }

    async fn write_all<A, N, H>(
        &self,
        tx: &mut Transaction<'static, Db>,
        stage: &mut WriteStage,
        aggregates: A,
        nodes: N,
        history: H,
    ) -> Result<WriteSummary>
    where
        A: Iterator<Item = Vec<AggregateRow>> + Send,
        N: Iterator<Item = Vec<NodeRow>> + Send,
        H: Iterator<Item = Vec<HistoryRow>> + Send,
    {
        *stage = WriteStage::WritingAggregates;
        let aggregates = insert_batches(tx, &self.aggregates_table, aggregates).await?;

        *stage = WriteStage::WritingNodes;
        let nodes = insert_batches(tx, &self.nodes_table, nodes).await?;

        *stage = WriteStage::WritingHistory;
        let history = insert_batches(tx, &self.history_table, history).await?;

        Ok(WriteSummary {
            aggregates,
            nodes,
            history,
        })
    }
}

/// Execute one multi-row insert per batch, stopping at the first error.
async fn insert_batches<R, B>(
    tx: &mut Transaction<'static, Db>,
    table: &TableSpec,
    batches: B,
) -> Result<TableWrite>
where
    R: InsertRow,
    B: Iterator<Item = Vec<R>> + Send,
{
    let mut written = TableWrite::default();

    for batch in batches {
        let rows = batch.len();
        if rows == 0 {
            continue;
        }

        let mut query: QueryBuilder<Db> = QueryBuilder::new(table.insert_prefix());
        query.push_values(batch, |mut values, row| row.push_binds(&mut values));
        query.build().execute(&mut **tx).await?;

        written.rows += rows;
        written.batches += 1;
        debug!(
            table = table.name,
            batch = written.batches,
            rows,
            "Inserted batch"
        );
    }

    Ok(written)
}
