//! Bulk import pipeline.
//!
//! Submitted items are projected into rows for the `aggregates`, `nodes`
//! and `import_history` tables, split into statements that stay under the
//! store's bound-parameter ceiling, and written in one transaction.

pub mod chunker;
pub mod projector;
mod service;
mod types;
pub mod writer;

pub use chunker::{BatchSize, Batches, ImportLimits, IntoBatches};
pub use projector::{AggregateRows, RowProjector};
pub use service::{ImportService, ImportSummary};
pub use types::{AggregateRow, HistoryRow, ImportItem, InsertRow, NodeRow, NodeType};
pub use writer::{ImportWriter, TableWrite, WriteStage, WriteSummary};
