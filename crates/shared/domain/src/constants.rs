//! Table names and `OpenAPI` tags shared across slices.

pub const REPORTS: &str = "reports";
pub const EMERGENCIES: &str = "emergencies";
pub const ANNOUNCEMENTS: &str = "announcements";
pub const USERS: &str = "users";
pub const ADMIN_USERS: &str = "admin_users";
pub const RESPONDERS: &str = "responders";
pub const AUDIT_LOGS: &str = "audit_logs";
pub const AUTH_IDENTITIES: &str = "auth_identities";

/// Tables whose changes are published on the change feed.
pub const OBSERVED_TABLES: &[&str] =
    &[REPORTS, EMERGENCIES, ANNOUNCEMENTS, USERS, ADMIN_USERS, RESPONDERS];

pub const SYSTEM_TAG: &str = "System";
pub const AUTH_TAG: &str = "Auth";
pub const FUNCTIONS_TAG: &str = "Functions";
pub const DASHBOARD_TAG: &str = "Dashboard";
pub const AUDIT_TAG: &str = "Audit";
