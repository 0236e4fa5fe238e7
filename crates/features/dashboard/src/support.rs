//! Request plumbing shared by the dashboard routes.

use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use brgy_audit::AuditEntry;
use brgy_domain::changes::{ChangeAction, RecordChange};
use brgy_identity::Caller;
use brgy_kernel::changes::publish_change;
use brgy_kernel::server::{ApiError, Paging};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))
}

pub(crate) fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))
}

pub(crate) const fn paging(limit: Option<u32>, offset: Option<u32>) -> Paging {
    Paging { limit, offset }
}

/// Turns a partial-update body into a merge document.
///
/// Absent fields are skipped during serialization, so an empty object means nothing to change.
/// Tables that track `updated_at` get it stamped.
pub(crate) fn patch_document<P: Serialize>(
    patch: &P,
    stamp_updated_at: bool,
) -> Result<Map<String, Value>, DashboardError> {
    let Ok(Value::Object(mut document)) = serde_json::to_value(patch) else {
        return Err(DashboardError::validation("Patch must be a JSON object"));
    };
    if document.is_empty() {
        return Err(DashboardError::validation("Patch contains no changes"));
    }
    if stamp_updated_at {
        document.insert("updated_at".to_owned(), Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)));
    }
    Ok(document)
}

impl Dashboard {
    /// Merges `document` into an existing row and returns the updated row.
    pub(crate) async fn apply_patch<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: &str,
        document: Map<String, Value>,
    ) -> Result<T, DashboardError> {
        self.db
            .merge::<T>(table, id, Value::Object(document))
            .await
            .context(format!("Updating {table}:{id}"))?
            .ok_or_else(|| DashboardError::not_found(table, id))
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: &str,
    ) -> Result<T, DashboardError> {
        self.db
            .select_one::<T>(table, id)
            .await
            .context(format!("Fetching {table}:{id}"))?
            .ok_or_else(|| DashboardError::not_found(table, id))
    }

    /// Publishes the change and appends the audit entry for a successful mutation.
    pub(crate) async fn announce<T: Serialize>(
        &self,
        caller: &Caller,
        change: Change<'_, T>,
        audit_action: &'static str,
        details: Option<String>,
    ) {
        let (table, action, id) = (change.table, change.action, change.id.to_owned());
        let record = change.row.and_then(|row| serde_json::to_value(row).ok());
        publish_change(&self.events, RecordChange::new(table, action, &id, record));

        let mut entry = AuditEntry::new(audit_action, table).entity_id(id).by(caller);
        if let Some(details) = details {
            entry = entry.details(details);
        }
        self.audit.record(entry).await;
    }
}

/// A committed row change, about to be announced.
#[derive(Debug)]
pub(crate) struct Change<'a, T> {
    pub(crate) table: &'static str,
    pub(crate) action: ChangeAction,
    pub(crate) id: &'a str,
    pub(crate) row: Option<&'a T>,
}

impl<'a, T> Change<'a, T> {
    pub(crate) const fn inserted(table: &'static str, id: &'a str, row: &'a T) -> Self {
        Self { table, action: ChangeAction::Insert, id, row: Some(row) }
    }

    pub(crate) const fn updated(table: &'static str, id: &'a str, row: &'a T) -> Self {
        Self { table, action: ChangeAction::Update, id, row: Some(row) }
    }

    pub(crate) const fn deleted(table: &'static str, id: &'a str) -> Self {
        Self { table, action: ChangeAction::Delete, id, row: None }
    }
}
