mod common;

use axum::http::StatusCode;
use brgy_domain::records::{AccountType, ReportStatus, VerificationStatus};
use common::harness;
use serde_json::json;

#[tokio::test]
async fn residents_exclude_responder_logins() {
    let h = harness().await;
    h.seed_user("u-res", AccountType::Resident, VerificationStatus::Pending).await;
    h.seed_user("u-ok", AccountType::Resident, VerificationStatus::Verified).await;
    h.seed_user("u-resp", AccountType::Responder, VerificationStatus::Verified).await;
    let token = h.token("clerk");

    let (status, body) = h.send("GET", "/residents", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = h.send("GET", "/residents?verification_status=pending", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "u-res");
}

#[tokio::test]
async fn residents_are_verified_by_officials_only() {
    let h = harness().await;
    h.seed_user("u-res", AccountType::Resident, VerificationStatus::Pending).await;
    h.seed_user("u-resp", AccountType::Responder, VerificationStatus::Verified).await;
    let patch = json!({ "verification_status": "verified" });

    let (status, _) = h.send("PATCH", "/residents/u-res", Some(&h.token("clerk")), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let official = h.token("official");
    let (status, body) = h.send("PATCH", "/residents/u-res", Some(&official), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verification_status"], "verified");

    let (status, _) = h.send("PATCH", "/residents/u-resp", Some(&official), Some(patch)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admins_cannot_deactivate_themselves() {
    let h = harness().await;
    let captain = h.token("captain");

    let (status, body) =
        h.send("PATCH", "/admins/captain", Some(&captain), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot deactivate your own account");

    let (status, _) =
        h.send("PATCH", "/admins/clerk", Some(&h.token("official")), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivated_admins_lose_access_immediately() {
    let h = harness().await;
    let clerk = h.token("clerk");

    let (status, _) = h.send("GET", "/admins", Some(&clerk), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        h.send("PATCH", "/admins/clerk", Some(&h.token("captain")), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = h.send("GET", "/admins", Some(&clerk), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stats_count_open_work() {
    let h = harness().await;
    h.seed_report("r1", ReportStatus::Pending, "flood", 1).await;
    h.seed_report("r2", ReportStatus::Pending, "fire", 2).await;
    h.seed_report("r3", ReportStatus::Resolved, "fire", 3).await;
    h.seed_emergency("e1", brgy_domain::records::EmergencyStatus::Active).await;
    h.seed_user("u1", AccountType::Resident, VerificationStatus::Pending).await;
    h.seed_user("u2", AccountType::Responder, VerificationStatus::Pending).await;

    let (status, body) = h.send("GET", "/stats", Some(&h.token("clerk")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending_reports"], 2);
    assert_eq!(body["active_emergencies"], 1);
    assert_eq!(body["pending_verifications"], 1);
    assert_eq!(body["published_announcements"], 0);
    assert_eq!(body["reports_by_status"]["resolved"], 1);
    assert_eq!(body["reports_by_status"]["rejected"], 0);
}

#[tokio::test]
async fn responders_filter_by_type() {
    let h = harness().await;
    let (status, body) = h.send("GET", "/responders?responder_type=fire", Some(&h.token("clerk")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = h.send("GET", "/responders?responder_type=navy", Some(&h.token("clerk")), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
