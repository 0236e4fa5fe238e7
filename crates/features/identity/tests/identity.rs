use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brgy_database::Database;
use brgy_domain::config::{ApiConfig, IdentityConfig};
use brgy_domain::records::AdminUser;
use brgy_domain::registry::InitializedSlice;
use brgy_domain::roles::{AdminRole, Capabilities};
use brgy_identity::{Identity, IdentityError, SurrealCallerDirectory, TokenResponse};
use brgy_kernel::server::ApiState;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "barangay-123";

async fn database() -> Database {
    Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap()
}

fn admin(id: &str, auth_id: &str, role: AdminRole, is_active: bool) -> AdminUser {
    AdminUser {
        id: id.to_owned(),
        auth_id: auth_id.to_owned(),
        full_name: format!("Admin {id}"),
        email: format!("{id}@barangay.ph"),
        role,
        is_active,
        created_at: Utc::now(),
    }
}

struct Harness {
    db: Database,
    identity: Identity,
    app: Router,
}

async fn harness() -> Harness {
    let db = database().await;
    let identity =
        Identity::new(&IdentityConfig::default(), Arc::new(SurrealCallerDirectory::new(db.clone())))
            .unwrap();
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db.clone())
        .register_slice(InitializedSlice::new(identity.clone()))
        .build()
        .unwrap();
    let (router, _) = brgy_identity::router().split_for_parts();
    Harness { db, identity, app: router.with_state(state) }
}

async fn seed_admin(db: &Database, id: &str, role: AdminRole, is_active: bool) {
    let auth_id = format!("auth-{id}");
    db.create_identity(&auth_id, &format!("{id}@barangay.ph"), PASSWORD).await.unwrap();
    db.create("admin_users", id, &admin(id, &auth_id, role, is_active)).await.unwrap();
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn sign_in(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let request = Request::post("/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": email, "password": password }).to_string()))
        .unwrap();
    call(app, request).await
}

async fn me(app: &Router, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::get("/auth/me");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    call(app, request.body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn sign_in_then_me_returns_the_caller() {
    let h = harness().await;
    seed_admin(&h.db, "official", AdminRole::BarangayOfficial, true).await;

    let (status, body) = sign_in(&h.app, "Official@Barangay.ph", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let token: TokenResponse = serde_json::from_value(body).unwrap();
    assert_eq!(token.token_type, "Bearer");

    let (status, body) = me(&h.app, Some(&token.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin_id"], "official");
    assert_eq!(body["identity_id"], "auth-official");
    assert_eq!(body["role"], "barangay_official");
    let capabilities: Vec<String> = serde_json::from_value(body["capabilities"].clone()).unwrap();
    assert!(capabilities.contains(&"view_audit".to_owned()));
    assert!(!capabilities.contains(&"manage_accounts".to_owned()));
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let h = harness().await;
    seed_admin(&h.db, "staff", AdminRole::Staff, true).await;

    assert_eq!(sign_in(&h.app, "staff@barangay.ph", "nope-nope").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(sign_in(&h.app, "ghost@barangay.ph", PASSWORD).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(sign_in(&h.app, " ", PASSWORD).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_or_garbage_tokens_are_unauthorized() {
    let h = harness().await;

    let (status, body) = me(&h.app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");

    assert_eq!(me(&h.app, Some("garbage")).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identities_without_active_admin_rows_are_forbidden() {
    let h = harness().await;
    h.db.create_identity("auth-resident", "resident@barangay.ph", PASSWORD).await.unwrap();
    seed_admin(&h.db, "retired", AdminRole::SystemAdministrator, false).await;

    let resident = h.identity.tokens.issue("auth-resident", "resident@barangay.ph").unwrap();
    assert_eq!(me(&h.app, Some(&resident.access_token)).await.0, StatusCode::FORBIDDEN);

    let retired = h.identity.tokens.issue("auth-retired", "retired@barangay.ph").unwrap();
    assert_eq!(me(&h.app, Some(&retired.access_token)).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cached_resolutions_are_bypassed_by_fresh_lookups() {
    let h = harness().await;
    seed_admin(&h.db, "chief", AdminRole::SystemAdministrator, true).await;
    let token = h.identity.tokens.issue("auth-chief", "chief@barangay.ph").unwrap().access_token;

    let caller = h.identity.resolve(&token).await.unwrap();
    assert!(caller.can(Capabilities::MANAGE_ACCOUNTS));

    h.db.merge::<AdminUser>("admin_users", "chief", json!({ "is_active": false })).await.unwrap();
    assert!(h.identity.resolve(&token).await.is_ok(), "served from cache");

    h.identity.invalidate("auth-chief").await;
    assert!(h.identity.resolve(&token).await.is_err());

    h.db.merge::<AdminUser>("admin_users", "chief", json!({ "is_active": true })).await.unwrap();
    assert!(h.identity.resolve_fresh(&token).await.is_ok());
    h.db.merge::<AdminUser>("admin_users", "chief", json!({ "is_active": false })).await.unwrap();
    assert!(h.identity.resolve(&token).await.is_ok(), "served from cache");

    assert!(matches!(
        h.identity.resolve_fresh(&token).await,
        Err(IdentityError::Forbidden { .. })
    ));
    assert!(h.identity.resolve(&token).await.is_err(), "failed fresh lookup evicts the cache");
}
