//! Audit slice.
//!
//! Other slices hold an [`AuditTrail`] and append entries after successful mutations; writes are
//! best-effort and never fail the request. `GET /audit-logs` lists entries for roles with
//! `VIEW_AUDIT`.

mod error;
mod handlers;
mod store;
mod trail;

pub use crate::error::{AuditError, AuditErrorExt};
pub use crate::handlers::AuditQuery;
pub use crate::store::{AuditFilter, AuditStore, SurrealAuditStore};
pub use crate::trail::{AuditEntry, AuditTrail};

use brgy_database::Database;
use brgy_domain::registry::{FeatureSlice, InitializedSlice};
use brgy_kernel::server::ApiState;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[derive(Debug)]
pub struct AuditInner {
    pub trail: AuditTrail,
}

/// Audit slice state.
#[derive(Debug, Clone)]
pub struct Audit {
    inner: Arc<AuditInner>,
}

impl Audit {
    pub fn new(trail: AuditTrail) -> Self {
        Self { inner: Arc::new(AuditInner { trail }) }
    }
}

impl Deref for Audit {
    type Target = AuditInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Audit {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds the database-backed trail shared with the other slices.
pub fn trail(database: &Database) -> AuditTrail {
    AuditTrail::new(Arc::new(SurrealAuditStore::new(database.clone())))
}

/// Initialize the audit slice around an existing trail.
pub fn init(trail: &AuditTrail) -> InitializedSlice {
    tracing::info!("Audit slice initialized");
    InitializedSlice::new(Audit::new(trail.clone()))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::list_audit_logs))
}
