//! Change notifications published whenever a row is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum ChangeAction {
        Insert => "insert",
        Update => "update",
        Delete => "delete",
    }
}

/// A single row-level change, as streamed to dashboard subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordChange {
    pub table: String,
    pub action: ChangeAction,
    pub id: String,
    /// The row after the change; absent for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub record: Option<serde_json::Value>,
    pub at: DateTime<Utc>,
}

impl RecordChange {
    pub fn new(
        table: impl Into<String>,
        action: ChangeAction,
        id: impl Into<String>,
        record: Option<serde_json::Value>,
    ) -> Self {
        Self { table: table.into(), action, id: id.into(), record, at: Utc::now() }
    }

    /// Serializes `row` as the change payload; rows that fail to serialize are sent without one.
    pub fn with_row<T: Serialize>(
        table: impl Into<String>,
        action: ChangeAction,
        id: impl Into<String>,
        row: &T,
    ) -> Self {
        Self::new(table, action, id, serde_json::to_value(row).ok())
    }
}
