//! Projection of submitted items into per-table row streams.
//!
//! Each stream is a single-pass iterator over the borrowed item slice.
//! Node and history rows are produced one item at a time. Aggregate rows
//! need grouping by parent, so that stream buffers one entry per distinct
//! parent, built on the first call to `next()`.

use std::collections::HashMap;
use std::vec;

use chrono::NaiveDate;

use super::types::{AggregateRow, HistoryRow, ImportItem, NodeRow};

/// Projects one import request into rows for each destination table.
#[derive(Debug, Clone, Copy)]
pub struct RowProjector<'a> {
    items: &'a [ImportItem],
    update_date: NaiveDate,
}

impl<'a> RowProjector<'a> {
    /// Create a projector over `items` imported at `update_date`.
    pub fn new(items: &'a [ImportItem], update_date: NaiveDate) -> Self {
        Self { items, update_date }
    }

    /// Number of submitted items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the import is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One row per item for the `nodes` table.
    pub fn node_rows(&self) -> impl Iterator<Item = NodeRow> + Send + 'a {
        let update_date = self.update_date;
        self.items.iter().map(move |item| NodeRow {
            id: item.id.clone(),
            parent_id: item.parent_id.clone(),
            url: item.url.clone(),
            size: item.size,
            update_date,
            node_type: item.node_type,
        })
    }

    /// One row per distinct parent for the `aggregates` table.
    pub fn aggregate_rows(&self) -> AggregateRows<'a> {
        AggregateRows {
            items: self.items,
            grouped: None,
        }
    }

    /// One row per item for the `import_history` table.
    pub fn history_rows(&self) -> impl Iterator<Item = HistoryRow> + Send + 'a {
        let update_date = self.update_date;
        self.items.iter().map(move |item| HistoryRow {
            node_id: item.id.clone(),
            update_date,
        })
    }
}

/// Per-parent size sums, in order of each parent's first appearance.
///
/// Roots contribute nothing; a missing size counts as zero.
#[derive(Debug)]
pub struct AggregateRows<'a> {
    items: &'a [ImportItem],
    grouped: Option<vec::IntoIter<(&'a str, i64)>>,
}

impl<'a> AggregateRows<'a> {
    fn group(items: &'a [ImportItem]) -> Vec<(&'a str, i64)> {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut sums: Vec<(&'a str, i64)> = Vec::new();

        for item in items {
            let Some(parent_id) = item.parent_id.as_deref() else {
                continue;
            };
            let size = item.size.unwrap_or(0);
            match index.get(parent_id) {
                Some(&slot) => sums[slot].1 = sums[slot].1.saturating_add(size),
                None => {
                    index.insert(parent_id, sums.len());
                    sums.push((parent_id, size));
                }
            }
        }

        sums
    }
}

impl Iterator for AggregateRows<'_> {
    type Item = AggregateRow;

    fn next(&mut self) -> Option<Self::Item> {
        let items = self.items;
        let grouped = self
            .grouped
            .get_or_insert_with(|| Self::group(items).into_iter());

        grouped.next().map(|(id, size)| AggregateRow {
            id: id.to_string(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::NodeType;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
    }

    fn sample_items() -> Vec<ImportItem> {
        vec![
            ImportItem::new("root", NodeType::Folder),
            ImportItem::new("docs", NodeType::Folder).with_parent("root"),
            ImportItem::new("a.txt", NodeType::File)
                .with_parent("docs")
                .with_url("/a.txt")
                .with_size(10),
            ImportItem::new("b.txt", NodeType::File)
                .with_parent("root")
                .with_size(5),
            ImportItem::new("c.txt", NodeType::File)
                .with_parent("docs")
                .with_size(7),
            ImportItem::new("empty", NodeType::File).with_parent("docs"),
        ]
    }

    #[test]
    fn test_node_rows_map_fields() {
        let items = sample_items();
        let projector = RowProjector::new(&items, date());

        let rows: Vec<NodeRow> = projector.node_rows().collect();
        assert_eq!(rows.len(), items.len());

        assert_eq!(rows[0].id, "root");
        assert_eq!(rows[0].parent_id, None);
        assert_eq!(rows[0].node_type, NodeType::Folder);

        assert_eq!(rows[2].id, "a.txt");
        assert_eq!(rows[2].parent_id.as_deref(), Some("docs"));
        assert_eq!(rows[2].url.as_deref(), Some("/a.txt"));
        assert_eq!(rows[2].size, Some(10));
        assert!(rows.iter().all(|r| r.update_date == date()));
    }

    #[test]
    fn test_node_rows_preserve_order() {
        let items = sample_items();
        let projector = RowProjector::new(&items, date());

        let ids: Vec<String> = projector.node_rows().map(|r| r.id).collect();
        let expected: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_aggregate_rows_sum_per_parent() {
        let items = sample_items();
        let projector = RowProjector::new(&items, date());

        let rows: Vec<AggregateRow> = projector.aggregate_rows().collect();
        assert_eq!(
            rows,
            vec![
                AggregateRow {
                    id: "root".to_string(),
                    size: 5,
                },
                AggregateRow {
                    id: "docs".to_string(),
                    size: 17,
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_sums_match_item_sizes() {
        let items: Vec<ImportItem> = (0..200)
            .map(|i| {
                let item = ImportItem::new(format!("n{}", i), NodeType::File)
                    .with_parent(format!("p{}", i % 7));
                if i % 3 == 0 {
                    item
                } else {
                    item.with_size(i as i64 * 11)
                }
            })
            .collect();
        let projector = RowProjector::new(&items, date());

        let rows: Vec<AggregateRow> = projector.aggregate_rows().collect();
        assert_eq!(rows.len(), 7);

        for row in rows {
            let expected: i64 = items
                .iter()
                .filter(|item| item.parent_id.as_deref() == Some(row.id.as_str()))
                .map(|item| item.size.unwrap_or(0))
                .sum();
            assert_eq!(row.size, expected, "parent {}", row.id);
        }
    }

    #[test]
    fn test_aggregate_rows_skip_roots() {
        let items = vec![
            ImportItem::new("a", NodeType::Folder),
            ImportItem::new("b", NodeType::File).with_size(3),
        ];
        let projector = RowProjector::new(&items, date());

        assert_eq!(projector.aggregate_rows().count(), 0);
    }

    #[test]
    fn test_aggregate_rows_saturate() {
        let items = vec![
            ImportItem::new("a", NodeType::File)
                .with_parent("p")
                .with_size(i64::MAX),
            ImportItem::new("b", NodeType::File)
                .with_parent("p")
                .with_size(1),
        ];
        let projector = RowProjector::new(&items, date());

        let rows: Vec<AggregateRow> = projector.aggregate_rows().collect();
        assert_eq!(rows[0].size, i64::MAX);
    }

    #[test]
    fn test_aggregate_rows_are_single_pass() {
        let items = sample_items();
        let projector = RowProjector::new(&items, date());

        let mut rows = projector.aggregate_rows();
        assert_eq!(rows.by_ref().count(), 2);
        assert!(rows.next().is_none());

        // A fresh call starts a new pass.
        assert_eq!(projector.aggregate_rows().count(), 2);
    }

    #[test]
    fn test_history_rows() {
        let items = sample_items();
        let projector = RowProjector::new(&items, date());

        let rows: Vec<HistoryRow> = projector.history_rows().collect();
        assert_eq!(rows.len(), items.len());
        assert_eq!(rows[3].node_id, "b.txt");
        assert!(rows.iter().all(|r| r.update_date == date()));
    }

    #[test]
    fn test_empty_import() {
        let items: Vec<ImportItem> = Vec::new();
        let projector = RowProjector::new(&items, date());

        assert!(projector.is_empty());
        assert_eq!(projector.node_rows().count(), 0);
        assert_eq!(projector.aggregate_rows().count(), 0);
        assert_eq!(projector.history_rows().count(), 0);
    }
}
