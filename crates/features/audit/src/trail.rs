use crate::error::AuditError;
use crate::store::{AuditFilter, AuditStore};
use brgy_domain::records::AuditLog;
use brgy_identity::Caller;
use brgy_kernel::safe_nanoid;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// An audit event before it is stamped with an id and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub actor_id: Option<String>,
    pub actor_email: Option<String>,
    pub details: Option<String>,
}

impl AuditEntry {
    /// `action` is a dotted verb such as `report.updated`; `entity` is the table touched.
    pub fn new(action: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            entity: entity.into(),
            entity_id: None,
            actor_id: None,
            actor_email: None,
            details: None,
        }
    }

    #[must_use]
    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Attributes the entry to the admin account behind `caller`.
    #[must_use]
    pub fn by(mut self, caller: &Caller) -> Self {
        self.actor_id = Some(caller.admin.id.clone());
        self.actor_email = Some(caller.email.clone());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn into_log(self) -> AuditLog {
        AuditLog {
            id: safe_nanoid!(),
            actor_id: self.actor_id,
            actor_email: self.actor_email,
            action: self.action,
            entity: self.entity,
            entity_id: self.entity_id,
            details: self.details,
            created_at: Utc::now(),
        }
    }
}

/// Cheap-to-clone handle that slices use to append audit entries.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Appends `entry`. A failed write is logged and otherwise ignored.
    pub async fn record(&self, entry: AuditEntry) {
        let log = entry.into_log();
        match self.store.insert(&log).await {
            Ok(()) => debug!(action = %log.action, entity = %log.entity, id = %log.id, "Audit entry recorded"),
            Err(e) => warn!(
                error = %e,
                action = %log.action,
                entity = %log.entity,
                entity_id = ?log.entity_id,
                "Failed to record audit entry"
            ),
        }
    }

    /// # Errors
    /// Returns [`AuditError::Store`] when the listing cannot be read.
    pub async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, AuditError> {
        self.store.list(filter).await
    }
}
