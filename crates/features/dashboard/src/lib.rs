//! Dashboard slice: the data operations behind the staff dashboard.
//!
//! Every route needs an authenticated admin. Reads are open to any active role; each mutation
//! checks its capability, publishes a [`RecordChange`](brgy_domain::changes::RecordChange) and
//! appends an audit entry. `GET /changes` streams those changes as server-sent events.

mod accounts;
mod announcements;
pub mod changes;
mod emergencies;
mod error;
mod reports;
mod stats;
mod support;

pub use crate::accounts::{AdminPatch, ResidentPatch, ResidentQuery, ResponderQuery};
pub use crate::announcements::{AnnouncementPatch, AnnouncementQuery, NewAnnouncement};
pub use crate::changes::{ChangesQuery, Subscription};
pub use crate::emergencies::{EmergencyPatch, EmergencyQuery};
pub use crate::error::{DashboardError, DashboardErrorExt};
pub use crate::reports::{ReportPatch, ReportQuery};
pub use crate::stats::DashboardStats;

use brgy_audit::AuditTrail;
use brgy_database::Database;
use brgy_domain::registry::{FeatureSlice, InitializedSlice};
use brgy_event_bus::EventBus;
use brgy_kernel::server::ApiState;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[derive(Debug)]
pub struct DashboardInner {
    pub db: Database,
    pub audit: AuditTrail,
    pub events: EventBus,
}

/// Dashboard slice state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

impl Dashboard {
    pub fn new(db: Database, audit: AuditTrail, events: EventBus) -> Self {
        Self { inner: Arc::new(DashboardInner { db, audit, events }) }
    }
}

impl Deref for Dashboard {
    type Target = DashboardInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Dashboard {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn init(database: &Database, audit: &AuditTrail, events: &EventBus) -> InitializedSlice {
    tracing::info!("Dashboard slice initialized");
    InitializedSlice::new(Dashboard::new(database.clone(), audit.clone(), events.clone()))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(reports::list_reports))
        .routes(routes!(reports::get_report, reports::update_report))
        .routes(routes!(emergencies::list_emergencies))
        .routes(routes!(emergencies::get_emergency, emergencies::update_emergency))
        .routes(routes!(announcements::list_announcements, announcements::create_announcement))
        .routes(routes!(announcements::update_announcement, announcements::delete_announcement))
        .routes(routes!(accounts::list_residents))
        .routes(routes!(accounts::update_resident))
        .routes(routes!(accounts::list_admins))
        .routes(routes!(accounts::update_admin))
        .routes(routes!(accounts::list_responders))
        .routes(routes!(stats::stats))
        .routes(routes!(changes::changes))
}
