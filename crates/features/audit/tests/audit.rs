use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brgy_audit::{Audit, AuditEntry, AuditError, AuditFilter, AuditStore, AuditTrail};
use brgy_database::Database;
use brgy_domain::config::{ApiConfig, IdentityConfig};
use brgy_domain::records::{AdminUser, AuditLog};
use brgy_domain::registry::InitializedSlice;
use brgy_domain::roles::AdminRole;
use brgy_identity::{CallerDirectory, Identity, IdentityError};
use brgy_kernel::server::ApiState;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn database() -> Database {
    Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap()
}

#[derive(Debug)]
struct BrokenStore;

#[async_trait]
impl AuditStore for BrokenStore {
    async fn insert(&self, _log: &AuditLog) -> Result<(), AuditError> {
        Err(AuditError::Internal { message: "disk full".into(), context: None })
    }

    async fn list(&self, _filter: &AuditFilter) -> Result<Vec<AuditLog>, AuditError> {
        Ok(Vec::new())
    }
}

#[derive(Debug)]
struct Directory(Vec<AdminUser>);

#[async_trait]
impl CallerDirectory for Directory {
    async fn verify_credentials(&self, _: &str, _: &str) -> Result<Option<String>, IdentityError> {
        Ok(None)
    }

    async fn admin_by_auth_id(&self, auth_id: &str) -> Result<Option<AdminUser>, IdentityError> {
        Ok(self.0.iter().find(|a| a.auth_id == auth_id).cloned())
    }
}

fn admin(id: &str, role: AdminRole) -> AdminUser {
    AdminUser {
        id: id.to_owned(),
        auth_id: format!("auth-{id}"),
        full_name: format!("Admin {id}"),
        email: format!("{id}@barangay.ph"),
        role,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn failed_writes_are_swallowed() {
    let trail = AuditTrail::new(Arc::new(BrokenStore));
    trail.record(AuditEntry::new("report.updated", "reports").entity_id("r1")).await;
}

#[tokio::test]
async fn entries_are_stamped_and_filterable() {
    let db = database().await;
    let trail = brgy_audit::trail(&db);

    trail.record(AuditEntry::new("report.updated", "reports").entity_id("r1").details("status=resolved")).await;
    trail.record(AuditEntry::new("announcement.created", "announcements").entity_id("a1")).await;

    let all = trail.list(&AuditFilter { limit: 50, ..AuditFilter::default() }).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|log| log.id.len() == 12));

    let reports = trail
        .list(&AuditFilter { entity: Some("reports".into()), limit: 50, ..AuditFilter::default() })
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].action, "report.updated");
    assert_eq!(reports[0].details.as_deref(), Some("status=resolved"));
}

async fn app(db: &Database) -> (Router, Identity) {
    let directory = Directory(vec![
        admin("official", AdminRole::BarangayOfficial),
        admin("staff", AdminRole::Staff),
    ]);
    let identity = Identity::new(&IdentityConfig::default(), Arc::new(directory)).unwrap();
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db.clone())
        .register_slice(InitializedSlice::new(identity.clone()))
        .register_slice(brgy_audit::init(&brgy_audit::trail(db)))
        .build()
        .unwrap();
    let (router, _) = brgy_audit::router().split_for_parts();
    (router.with_state(state), identity)
}

async fn list(app: &Router, token: &str, query: &str) -> (StatusCode, Value) {
    let request = Request::get(format!("/audit-logs{query}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn listing_requires_view_audit() {
    let db = database().await;
    let (app, identity) = app(&db).await;
    let audit = brgy_audit::trail(&db);
    audit.record(AuditEntry::new("report.updated", "reports").entity_id("r1")).await;
    audit.record(AuditEntry::new("resident.updated", "users").entity_id("u1")).await;

    let staff = identity.tokens.issue("auth-staff", "staff@barangay.ph").unwrap();
    let (status, body) = list(&app, &staff.access_token, "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("view_audit"));

    let official = identity.tokens.issue("auth-official", "official@barangay.ph").unwrap();
    let (status, body) = list(&app, &official.access_token, "?entity=users&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entity_id"], "u1");
}

#[tokio::test]
async fn malformed_query_parameters_get_a_json_error() {
    let db = database().await;
    let (app, identity) = app(&db).await;
    let official = identity.tokens.issue("auth-official", "official@barangay.ph").unwrap();

    let (status, body) = list(&app, &official.access_token, "?limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
}

#[tokio::test]
async fn audit_slice_is_registered_by_type() {
    let db = database().await;
    let slice = brgy_audit::init(&brgy_audit::trail(&db));
    assert_eq!(slice.name, "audit");
    assert!(slice.state.as_any().downcast_ref::<Audit>().is_some());
}
