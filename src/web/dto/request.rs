//! Request DTOs for Web API.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::validation::{parse_update_date, update_date_format};
use crate::import::{ImportItem, NodeType};
use crate::web::error::ApiError;

/// One node in an import request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportItemRequest {
    /// Node identifier.
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub id: String,
    /// URL (optional).
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Must be 1-256 characters"))]
    pub url: Option<String>,
    /// Parent identifier (omitted for roots).
    #[serde(default)]
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub parent_id: Option<String>,
    /// FILE or FOLDER.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Size in bytes (optional).
    #[serde(default)]
    #[validate(range(min = 0, message = "Must not be negative"))]
    pub size: Option<i64>,
}

impl From<ImportItemRequest> for ImportItem {
    fn from(req: ImportItemRequest) -> Self {
        ImportItem {
            id: req.id,
            url: req.url,
            parent_id: req.parent_id,
            node_type: req.node_type,
            size: req.size,
        }
    }
}

/// Bulk import request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Nodes to import.
    #[validate(nested)]
    pub items: Vec<ImportItemRequest>,
    /// Import timestamp, e.g. `2022-05-28T21:12:01.000Z`.
    #[validate(custom(function = "update_date_format"))]
    pub update_date: String,
}

impl ImportRequest {
    /// Convert into domain items and the import date.
    ///
    /// Call after validation; an unparseable date is still reported as a
    /// validation error.
    pub fn into_import(self) -> Result<(Vec<ImportItem>, NaiveDate), ApiError> {
        let update_date = parse_update_date(&self.update_date).ok_or_else(|| {
            let mut details = std::collections::HashMap::new();
            details.insert(
                "updateDate".to_string(),
                vec!["Must be an ISO 8601 UTC timestamp".to_string()],
            );
            ApiError::validation(details)
        })?;
        let items = self.items.into_iter().map(ImportItem::from).collect();
        Ok((items, update_date))
    }
}
