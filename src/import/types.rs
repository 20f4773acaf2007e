//! Import item and row types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::query_builder::Separated;

use crate::db::Db;

/// Kind of a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    /// A file; its size is authoritative.
    File,
    /// A folder; its size is derived from its children.
    Folder,
}

impl NodeType {
    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::File => "FILE",
            NodeType::Folder => "FOLDER",
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FILE" => Ok(NodeType::File),
            "FOLDER" => Ok(NodeType::Folder),
            _ => Err(format!("unknown node type: {}", s)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated node submitted in an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportItem {
    /// Unique node identifier.
    pub id: String,
    /// Optional URL.
    pub url: Option<String>,
    /// Parent identifier (None for roots).
    pub parent_id: Option<String>,
    /// File or folder.
    pub node_type: NodeType,
    /// Size in bytes, if supplied.
    pub size: Option<i64>,
}

impl ImportItem {
    /// Create a root item with no url or size.
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            url: None,
            parent_id: None,
            node_type,
            size: None,
        }
    }

    /// Set the parent identifier.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the size.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }
}

/// A row that can be appended to a multi-row `INSERT`.
///
/// Values must be pushed in the column order of the destination
/// [`TableSpec`](crate::db::TableSpec).
pub trait InsertRow: Send {
    /// Bind this row's values into the current `VALUES` tuple.
    fn push_binds(self, row: &mut Separated<'_, '_, Db, &'static str>);
}

/// Row for the `nodes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub url: Option<String>,
    pub size: Option<i64>,
    pub update_date: NaiveDate,
    pub node_type: NodeType,
}

impl InsertRow for NodeRow {
    fn push_binds(self, row: &mut Separated<'_, '_, Db, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.parent_id)
            .push_bind(self.url)
            .push_bind(self.size)
            .push_bind(self.update_date)
            .push_bind(self.node_type.as_str().to_string());
    }
}

/// Row for the `aggregates` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    pub id: String,
    pub size: i64,
}

impl InsertRow for AggregateRow {
    fn push_binds(self, row: &mut Separated<'_, '_, Db, &'static str>) {
        row.push_bind(self.id).push_bind(self.size);
    }
}

/// Row for the `import_history` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub node_id: String,
    pub update_date: NaiveDate,
}

impl InsertRow for HistoryRow {
    fn push_binds(self, row: &mut Separated<'_, '_, Db, &'static str>) {
        row.push_bind(self.node_id).push_bind(self.update_date);
    }
}
