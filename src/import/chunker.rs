//! Bounded batching of row streams.
//!
//! A single statement may bind at most `max_query_args` parameters, so a
//! table with `C` columns takes at most `floor(max_query_args / C)` rows
//! per insert.

use crate::db::{TableSpec, AGGREGATES_TABLE, HISTORY_TABLE, NODES_TABLE};
use crate::{DiskError, Result};

/// Maximum rows per insert statement. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(usize);

impl BatchSize {
    /// A fixed number of rows per batch.
    pub fn new(rows: usize) -> Result<Self> {
        if rows == 0 {
            return Err(DiskError::Config(
                "batch size must be at least one row".to_string(),
            ));
        }
        Ok(Self(rows))
    }

    /// Rows of `table` that fit into `max_query_args` bound parameters.
    pub fn for_table(max_query_args: usize, table: &TableSpec) -> Result<Self> {
        let columns = table.column_count();
        if columns == 0 {
            return Err(DiskError::Config(format!(
                "table {} declares no insert columns",
                table.name
            )));
        }
        if columns > max_query_args {
            return Err(DiskError::Config(format!(
                "table {} binds {} parameters per row, above the limit of {}",
                table.name, columns, max_query_args
            )));
        }
        Ok(Self(max_query_args / columns))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0
    }
}

/// Batch sizes for every table the import writes.
///
/// Computed once at startup; a configuration that cannot fit one row of
/// every table is rejected before any request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub aggregates: BatchSize,
    pub nodes: BatchSize,
    pub history: BatchSize,
}

impl ImportLimits {
    /// Derive batch sizes from the per-statement parameter ceiling.
    pub fn new(max_query_args: usize) -> Result<Self> {
        Self::for_tables(
            max_query_args,
            &AGGREGATES_TABLE,
            &NODES_TABLE,
            &HISTORY_TABLE,
        )
    }

    /// Derive batch sizes for explicitly supplied table descriptors.
    pub fn for_tables(
        max_query_args: usize,
        aggregates: &TableSpec,
        nodes: &TableSpec,
        history: &TableSpec,
    ) -> Result<Self> {
        Ok(Self {
            aggregates: BatchSize::for_table(max_query_args, aggregates)?,
            nodes: BatchSize::for_table(max_query_args, nodes)?,
            history: BatchSize::for_table(max_query_args, history)?,
        })
    }
}

/// Iterator adapter yielding consecutive groups of at most `size` items.
///
/// Pulls only the items of the group being built; the final group may be
/// shorter. Once the inner iterator is exhausted it keeps returning `None`.
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        (
            lower.div_ceil(self.size),
            upper.map(|n| n.div_ceil(self.size)),
        )
    }
}

/// Extension trait adding [`batches`](IntoBatches::batches) to iterators.
pub trait IntoBatches: Iterator + Sized {
    /// Group this iterator into batches of at most `size` items.
    fn batches(self, size: BatchSize) -> Batches<Self> {
        Batches {
            inner: self,
            size: size.rows(),
        }
    }
}

impl<I: Iterator> IntoBatches for I {}
