use crate::error::{AuditError, AuditErrorExt};
use async_trait::async_trait;
use brgy_database::{Database, Query};
use brgy_domain::constants::AUDIT_LOGS;
use brgy_domain::records::AuditLog;
use std::fmt::Debug;

/// Filters for the audit listing; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub entity: Option<String>,
    pub actor_id: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[async_trait]
pub trait AuditStore: Debug + Send + Sync {
    async fn insert(&self, log: &AuditLog) -> Result<(), AuditError>;
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, AuditError>;
}

#[derive(Debug, Clone)]
pub struct SurrealAuditStore {
    db: Database,
}

impl SurrealAuditStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditStore for SurrealAuditStore {
    async fn insert(&self, log: &AuditLog) -> Result<(), AuditError> {
        self.db.create(AUDIT_LOGS, &log.id, log).await.context("Writing audit entry")
    }

    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, AuditError> {
        let mut query = Query::new().limit(filter.limit).offset(filter.offset);
        if let Some(entity) = &filter.entity {
            query = query.filter("entity", entity.as_str());
        }
        if let Some(actor_id) = &filter.actor_id {
            query = query.filter("actor_id", actor_id.as_str());
        }
        self.db.select_all(AUDIT_LOGS, &query).await.context("Listing audit entries")
    }
}
