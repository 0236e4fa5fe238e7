//! Facade crate for the incident hub's feature slices and shared modules.
//! Re-exports domain/kernel primitives and aggregates slice initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! Call [`init`] once at startup to build every slice, register them on the
//! [`ApiState`](kernel::server::ApiState), then mount [`router`].

use brgy_database::Database;
pub use brgy_domain as domain;
use brgy_domain::config::ApiConfig;
use brgy_domain::registry::InitializedSlice;
use brgy_event_bus::EventBus;
pub use brgy_kernel as kernel;
use brgy_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;

/// Feature registry for runtime introspection.
pub mod features {
    pub use brgy_audit as audit;
    pub use brgy_dashboard as dashboard;
    pub use brgy_evidence as evidence;
    pub use brgy_identity as identity;
    pub use brgy_provisioning as provisioning;

    /// Slices every server build registers, in initialization order.
    pub const ENABLED: &[&str] = &["identity", "audit", "evidence", "provisioning", "dashboard"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize every feature slice.
///
/// The audit trail is built first and shared with the slices that record mutations.
///
/// # Errors
/// Returns an error if a slice rejects its configuration.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let audit = features::audit::trail(database);

    let slices = vec![
        features::identity::init(&config.security.identity, database)?,
        features::audit::init(&audit),
        features::evidence::init(config, database, events)?,
        features::provisioning::init(database, &audit, events),
        features::dashboard::init(database, &audit, events),
    ];

    tracing::debug!(count = slices.len(), "Feature slices initialized");
    Ok(slices)
}

/// Every slice's routes plus the system routes, ready for state.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(kernel::server::router::system_router())
        .merge(features::identity::router())
        .merge(features::evidence::router())
        .merge(features::provisioning::router())
        .merge(features::dashboard::router())
        .merge(features::audit::router())
}
