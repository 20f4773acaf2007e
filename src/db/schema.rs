//! Database schema and migrations for disk.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded. The [`TableSpec`] descriptors name the columns the import
//! pipeline writes, so batch sizes can be derived from them without
//! consulting the live schema.

/// Destination table of a multi-row insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: &'static str,
    /// Columns bound by each inserted row, in bind order.
    pub columns: &'static [&'static str],
}

impl TableSpec {
    /// Number of parameters a single row binds.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `INSERT INTO table (a, b, ...) ` prefix for a multi-row insert.
    pub fn insert_prefix(&self) -> String {
        format!("INSERT INTO {} ({}) ", self.name, self.columns.join(", "))
    }
}

/// Per-parent aggregated child sizes.
pub const AGGREGATES_TABLE: TableSpec = TableSpec {
    name: "aggregates",
    columns: &["id", "size"],
};

/// Imported files and folders.
pub const NODES_TABLE: TableSpec = TableSpec {
    name: "nodes",
    columns: &["id", "parent_id", "url", "size", "update_date", "node_type"],
};

/// One row per node per import. `id` is assigned by the store.
pub const HISTORY_TABLE: TableSpec = TableSpec {
    name: "import_history",
    columns: &["node_id", "update_date"],
};

/// Database migrations.
///
/// `aggregates.id -> nodes.id` is checked at commit, so aggregates may be
/// written before the nodes they describe.
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema
    r#"
CREATE TABLE aggregates (
    id      TEXT NOT NULL PRIMARY KEY
            REFERENCES nodes(id) ON DELETE CASCADE DEFERRABLE INITIALLY DEFERRED,
    size    INTEGER NOT NULL
);

CREATE TABLE nodes (
    id          TEXT NOT NULL PRIMARY KEY,
    parent_id   TEXT REFERENCES aggregates(id) ON DELETE CASCADE,
    url         TEXT,
    size        INTEGER,
    update_date TEXT NOT NULL,
    node_type   TEXT NOT NULL CHECK (node_type IN ('FILE', 'FOLDER'))
);

CREATE INDEX idx_nodes_parent_id ON nodes(parent_id);
CREATE INDEX idx_nodes_update_date ON nodes(update_date);

CREATE TABLE import_history (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    node_id     TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    update_date TEXT NOT NULL
);

CREATE INDEX idx_import_history_node_id ON import_history(node_id);
CREATE INDEX idx_import_history_update_date ON import_history(update_date);
"#,
];

/// Database migrations.
///
/// `aggregates.id -> nodes.id` is checked at commit, so aggregates may be
/// written before the nodes they describe.
#[cfg(feature = "postgres")]
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema
    r#"
CREATE TABLE aggregates (
    id      TEXT NOT NULL PRIMARY KEY,
    size    BIGINT NOT NULL
);

CREATE TABLE nodes (
    id          TEXT NOT NULL PRIMARY KEY,
    parent_id   TEXT REFERENCES aggregates(id) ON DELETE CASCADE,
    url         TEXT,
    size        BIGINT,
    update_date DATE NOT NULL,
    node_type   TEXT NOT NULL CHECK (node_type IN ('FILE', 'FOLDER'))
);

ALTER TABLE aggregates
    ADD CONSTRAINT fk_aggregates_id_nodes FOREIGN KEY (id)
    REFERENCES nodes(id) ON DELETE CASCADE DEFERRABLE INITIALLY DEFERRED;

CREATE INDEX idx_nodes_parent_id ON nodes(parent_id);
CREATE INDEX idx_nodes_update_date ON nodes(update_date);

CREATE TABLE import_history (
    id          BIGSERIAL PRIMARY KEY,
    node_id     TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    update_date DATE NOT NULL
);

CREATE INDEX idx_import_history_node_id ON import_history(node_id);
CREATE INDEX idx_import_history_update_date ON import_history(update_date);
"#,
];
