use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brgy_database::Database;
use brgy_domain::changes::RecordChange;
use brgy_domain::config::{ApiConfig, IdentityConfig};
use brgy_domain::evidence::{Assessment, NEUTRAL_SCORE, Verdict};
use brgy_domain::records::{AdminUser, Report};
use brgy_domain::roles::AdminRole;
use brgy_domain::registry::InitializedSlice;
use brgy_event_bus::EventBus;
use brgy_evidence::{
    Evidence, EvidenceError, EvidenceStore, LanguageModel, ModelRequest, SurrealEvidenceStore,
};
use brgy_identity::{CallerDirectory, Identity, IdentityError};
use brgy_kernel::server::{ApiState, ErrorBody};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug)]
struct ScriptedModel {
    reply: Result<String, &'static str>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(reply.to_owned()), requests: Mutex::default() })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: Err("connection reset"), requests: Mutex::default() })
    }

    fn last_request(&self) -> ModelRequest {
        self.requests.lock().unwrap().last().cloned().expect("model was called")
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> Result<String, EvidenceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(|message| EvidenceError::Status {
            message: message.into(),
            context: None,
        })
    }
}

#[derive(Debug, Default)]
struct RecordingStore {
    writes: Mutex<Vec<(String, Assessment)>>,
}

#[async_trait]
impl EvidenceStore for RecordingStore {
    async fn record_assessment(
        &self,
        report_id: &str,
        assessment: &Assessment,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Report>, EvidenceError> {
        self.writes.lock().unwrap().push((report_id.to_owned(), assessment.clone()));
        Ok(Some(report(report_id, checked_at)))
    }
}

fn report(id: &str, at: DateTime<Utc>) -> Report {
    serde_json::from_value(json!({
        "id": id,
        "category": "Fire",
        "title": "Smoke near the market",
        "status": "pending",
        "created_at": at,
        "updated_at": at,
    }))
    .unwrap()
}

const LIKELY_REAL: &str =
    r#"{"verdict": "likely_real", "score": 0.9, "explanation": "Photo matches the fire report."}"#;

async fn database() -> Database {
    Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap()
}

#[derive(Debug)]
struct Admins;

#[async_trait]
impl CallerDirectory for Admins {
    async fn verify_credentials(&self, _: &str, _: &str) -> Result<Option<String>, IdentityError> {
        Ok(None)
    }

    async fn admin_by_auth_id(&self, auth_id: &str) -> Result<Option<AdminUser>, IdentityError> {
        Ok((auth_id == "auth-clerk").then(|| AdminUser {
            id: "clerk".to_owned(),
            auth_id: auth_id.to_owned(),
            full_name: "Desk Clerk".to_owned(),
            email: "clerk@barangay.ph".to_owned(),
            role: AdminRole::Staff,
            is_active: true,
            created_at: Utc::now(),
        }))
    }
}

fn identity() -> Identity {
    Identity::new(&IdentityConfig::default(), Arc::new(Admins)).unwrap()
}

fn clerk_token() -> String {
    identity().tokens.issue("auth-clerk", "clerk@barangay.ph").unwrap().access_token
}

async fn app(evidence: Evidence, events: EventBus) -> Router {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(database().await)
        .events(events)
        .register_slice(InitializedSlice::new(identity()))
        .register_slice(InitializedSlice::new(evidence))
        .build()
        .unwrap();
    let (router, _) = brgy_evidence::router().split_for_parts();
    router.with_state(state)
}

async fn post(app: Router, body: Value) -> (StatusCode, Value) {
    send(app, None, body).await
}

async fn send(app: Router, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request =
        Request::post("/functions/assess-evidence").header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app.oneshot(request.body(Body::from(body.to_string())).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn image_is_sent_to_the_vision_model_even_when_a_video_comes_first() {
    let model = ScriptedModel::replying(LIKELY_REAL);
    let events = EventBus::new();
    let evidence = Evidence::from_parts(model.clone(), Arc::new(RecordingStore::default()), events.clone());

    let (status, body) = post(
        app(evidence, events).await,
        json!({ "report": {
            "category": "Fire",
            "title": "Smoke near the market",
            "media_urls": ["https://cdn.example/clip.mp4", "https://cdn.example/photo.jpg"],
        }}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "likely_real");
    assert_eq!(model.last_request().image_url.as_deref(), Some("https://cdn.example/photo.jpg"));
}

#[tokio::test]
async fn video_only_reports_use_the_text_path() {
    let model = ScriptedModel::replying(LIKELY_REAL);
    let events = EventBus::new();
    let evidence = Evidence::from_parts(model.clone(), Arc::new(RecordingStore::default()), events.clone());

    let (status, _) = post(
        app(evidence, events).await,
        json!({ "report": {
            "category": "Flood",
            "title": "River overflow",
            "video_url": "https://cdn.example/report-videos/abc",
            "media_type": "image",
        }}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let request = model.last_request();
    assert!(request.image_url.is_none());
    assert!(request.prompt.contains("video was attached"));
}

#[tokio::test]
async fn unusable_responses_degrade_to_uncertain() {
    for model in [ScriptedModel::replying("I think it looks fine."), ScriptedModel::replying("   "), ScriptedModel::failing()] {
        let events = EventBus::new();
        let evidence = Evidence::from_parts(model, Arc::new(RecordingStore::default()), events.clone());

        let (status, body) =
            post(app(evidence, events).await, json!({ "report": { "title": "x" } })).await;

        assert_eq!(status, StatusCode::OK);
        let assessment: Assessment = serde_json::from_value(body).unwrap();
        assert_eq!(assessment.verdict, Verdict::Uncertain);
        assert!((assessment.score - NEUTRAL_SCORE).abs() < f64::EPSILON);
        assert!(!assessment.explanation.is_empty());
    }
}

#[tokio::test]
async fn verdicts_are_written_back_and_announced() {
    let store = Arc::new(RecordingStore::default());
    let events = EventBus::new();
    let mut changes = events.subscribe::<RecordChange>().unwrap();
    let evidence =
        Evidence::from_parts(ScriptedModel::replying(LIKELY_REAL), store.clone(), events.clone());

    let (status, _) = send(
        app(evidence, events).await,
        Some(&clerk_token()),
        json!({ "report": { "id": "reports:r42", "title": "Smoke", "image_url": "https://x/a.png" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let writes = store.writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "r42");
    assert_eq!(writes[0].1.verdict, Verdict::LikelyReal);

    let change = changes.try_recv().unwrap();
    assert_eq!(change.table, "reports");
    assert_eq!(change.id, "r42");
}

#[tokio::test]
async fn anonymous_callers_get_a_verdict_without_write_back() {
    let store = Arc::new(RecordingStore::default());
    let events = EventBus::new();
    let mut changes = events.subscribe::<RecordChange>().unwrap();
    let evidence =
        Evidence::from_parts(ScriptedModel::replying(LIKELY_REAL), store.clone(), events.clone());

    let (status, body) =
        post(app(evidence, events).await, json!({ "report": { "id": "reports:r42", "title": "Smoke" } }))
            .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "likely_real");
    assert!(store.writes.lock().unwrap().is_empty());
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn invalid_tokens_are_rejected_before_assessment() {
    let model = ScriptedModel::replying(LIKELY_REAL);
    let store = Arc::new(RecordingStore::default());
    let events = EventBus::new();
    let evidence = Evidence::from_parts(model.clone(), store.clone(), events.clone());

    let (status, body) = send(
        app(evidence, events).await,
        Some("not-a-jwt"),
        json!({ "report": { "id": "reports:r42", "title": "Smoke" } }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
    assert!(model.requests.lock().unwrap().is_empty());
    assert!(store.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reports_without_ids_are_not_written() {
    let store = Arc::new(RecordingStore::default());
    let events = EventBus::new();
    let evidence =
        Evidence::from_parts(ScriptedModel::replying(LIKELY_REAL), store.clone(), events.clone());

    send(
        app(evidence, events).await,
        Some(&clerk_token()),
        json!({ "report": { "title": "Smoke", "id": "  " } }),
    )
    .await;

    assert!(store.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let events = EventBus::new();
    let evidence = Evidence::from_parts(
        ScriptedModel::replying(LIKELY_REAL),
        Arc::new(RecordingStore::default()),
        events.clone(),
    );

    let (status, body) = post(app(evidence, events).await, json!({ "not_a_report": true })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_value(body).unwrap();
    assert!(body.error.starts_with("Invalid request body"));
}

#[tokio::test]
async fn surreal_store_merges_verdict_fields() {
    let db = database().await;
    let now = Utc::now();
    db.create("reports", "r1", &report("r1", now)).await.unwrap();
    let store = SurrealEvidenceStore::new(db.clone());

    let updated = store
        .record_assessment("r1", &Assessment::new(Verdict::Suspicious, 0.8, "Stock photo"), now)
        .await
        .unwrap()
        .expect("report exists");

    assert_eq!(updated.evidence_verdict, Some(Verdict::Suspicious));
    assert_eq!(updated.evidence_explanation.as_deref(), Some("Stock photo"));
    assert_eq!(updated.title, "Smoke near the market");

    let missing = store.record_assessment("nope", &Assessment::uncertain("x"), now).await.unwrap();
    assert!(missing.is_none());
}
