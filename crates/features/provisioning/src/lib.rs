//! Account provisioning slice.
//!
//! `POST /functions/create-admin` lets a privileged admin create an auth identity plus its
//! linked rows: an `admin_users` row, or a `users` row and a `responders` row. The steps run
//! as a [`Saga`]; if one fails, the completed ones are undone in reverse.

mod directory;
mod error;
mod handlers;
mod provision;
mod request;
mod saga;

pub use crate::directory::{AccountDirectory, SurrealAccountDirectory};
pub use crate::error::{ProvisioningError, ProvisioningErrorExt};
pub use crate::provision::{Provisioned, Provisioner};
pub use crate::request::{
    AccountKind, CreateAccountRequest, CreateAccountResponse, MIN_PASSWORD_LEN, NewAccount,
};
pub use crate::saga::{Saga, Undo};

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
pub struct ProvisioningInner {
    pub provisioner: Provisioner,
    pub audit: AuditTrail,
    pub events: EventBus,
}

/// Provisioning slice state.
#[derive(Debug, Clone)]
pub struct Provisioning {
    inner: Arc<ProvisioningInner>,
}

impl Provisioning {
    pub fn new(directory: Arc<dyn AccountDirectory>, audit: AuditTrail, events: EventBus) -> Self {
        Self {
            inner: Arc::new(ProvisioningInner { provisioner: Provisioner::new(directory), audit, events }),
        }
    }
}

impl Deref for Provisioning {
    type Target = ProvisioningInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Provisioning {
    fn name(&self) -> &'static str {
        "provisioning"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Initialize the provisioning slice backed by the database.
pub fn init(database: &Database, audit: &AuditTrail, events: &EventBus) -> InitializedSlice {
    let directory = Arc::new(SurrealAccountDirectory::new(database.clone()));
    tracing::info!("Provisioning slice initialized");
    InitializedSlice::new(Provisioning::new(directory, audit.clone(), events.clone()))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::create_account))
}
