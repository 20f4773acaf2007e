//! disk - bulk import service for filesystem trees
//!
//! Files and folders are submitted in bulk and stored atomically across the
//! `nodes`, `aggregates` and `import_history` tables, in statements that
//! never exceed the store's bound-parameter ceiling.

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{DiskError, Result};
pub use import::{ImportItem, ImportLimits, ImportService, ImportSummary, NodeType};
pub use web::WebServer;
