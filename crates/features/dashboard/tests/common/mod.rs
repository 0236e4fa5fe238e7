#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brgy_database::Database;
use brgy_domain::config::{ApiConfig, IdentityConfig};
use brgy_domain::records::{
    AccountType, AdminUser, Emergency, EmergencyStatus, Report, ReportStatus, UserAccount,
    VerificationStatus,
};
use brgy_domain::registry::InitializedSlice;
use brgy_domain::roles::AdminRole;
use brgy_event_bus::EventBus;
use brgy_identity::{Identity, SurrealCallerDirectory};
use brgy_kernel::server::ApiState;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct Harness {
    pub db: Database,
    pub identity: Identity,
    pub events: EventBus,
    pub app: Router,
}

pub async fn harness() -> Harness {
    let db = Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap();
    let events = EventBus::new();
    let identity =
        Identity::new(&IdentityConfig::default(), Arc::new(SurrealCallerDirectory::new(db.clone())))
            .unwrap();
    let audit = brgy_audit::trail(&db);

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db.clone())
        .events(events.clone())
        .register_slice(InitializedSlice::new(identity.clone()))
        .register_slice(brgy_dashboard::init(&db, &audit, &events))
        .build()
        .unwrap();
    let (router, _) = brgy_dashboard::router().split_for_parts();

    let harness = Harness { db, identity, events, app: router.with_state(state) };
    harness.seed_admin("captain", AdminRole::SystemAdministrator).await;
    harness.seed_admin("official", AdminRole::BarangayOfficial).await;
    harness.seed_admin("clerk", AdminRole::Staff).await;
    harness
}

impl Harness {
    async fn seed_admin(&self, id: &str, role: AdminRole) {
        let admin = AdminUser {
            id: id.to_owned(),
            auth_id: format!("auth-{id}"),
            full_name: format!("Admin {id}"),
            email: format!("{id}@barangay.ph"),
            role,
            is_active: true,
            created_at: Utc::now(),
        };
        self.db.create("admin_users", id, &admin).await.unwrap();
    }

    pub fn token(&self, admin_id: &str) -> String {
        self.identity
            .tokens
            .issue(&format!("auth-{admin_id}"), &format!("{admin_id}@barangay.ph"))
            .unwrap()
            .access_token
    }

    pub async fn seed_report(&self, id: &str, status: ReportStatus, category: &str, age_minutes: i64) {
        let at = Utc::now() - Duration::minutes(age_minutes);
        let report = Report {
            id: id.to_owned(),
            reporter_id: Some("resident-1".to_owned()),
            category: category.to_owned(),
            title: format!("Report {id}"),
            description: "Water rising on the main road".to_owned(),
            location: "Purok 3".to_owned(),
            status,
            responder_notes: None,
            media_urls: Vec::new(),
            evidence_verdict: None,
            evidence_score: None,
            evidence_explanation: None,
            evidence_checked_at: None,
            created_at: at,
            updated_at: at,
        };
        self.db.create("reports", id, &report).await.unwrap();
    }

    pub async fn seed_emergency(&self, id: &str, status: EmergencyStatus) {
        let emergency = Emergency {
            id: id.to_owned(),
            reporter_id: None,
            emergency_type: "fire".to_owned(),
            description: "Smoke from a house".to_owned(),
            location: "Purok 1".to_owned(),
            latitude: Some(14.6),
            longitude: Some(121.0),
            status,
            responder_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.db.create("emergencies", id, &emergency).await.unwrap();
    }

    pub async fn seed_user(&self, id: &str, account_type: AccountType, status: VerificationStatus) {
        let user = UserAccount {
            id: id.to_owned(),
            auth_id: None,
            full_name: format!("User {id}"),
            email: format!("{id}@mail.ph"),
            phone: None,
            address: Some("Purok 2".to_owned()),
            account_type,
            verification_status: status,
            is_active: true,
            created_at: Utc::now(),
        };
        self.db.create("users", id, &user).await.unwrap();
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self.app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
