use brgy_domain::changes::{ChangeAction, RecordChange};
use brgy_domain::evidence::{Assessment, NEUTRAL_SCORE, Verdict};
use brgy_domain::records::{Report, ReportStatus};
use serde_json::json;

#[test]
fn report_deserializes_with_optional_fields_missing() {
    let raw = json!({
        "id": "r1",
        "category": "flood",
        "title": "Street flooded",
        "status": "in_progress",
        "created_at": "2026-01-02T03:04:05Z",
        "updated_at": "2026-01-02T03:04:05Z"
    });

    let report: Report = serde_json::from_value(raw).expect("report");
    assert_eq!(report.status, ReportStatus::InProgress);
    assert!(report.media_urls.is_empty());
    assert!(report.evidence_verdict.is_none());
}

#[test]
fn assessment_clamps_score() {
    assert!((Assessment::new(Verdict::LikelyReal, 1.7, "x").score - 1.0).abs() < f64::EPSILON);
    assert!(Assessment::new(Verdict::Suspicious, -0.3, "x").score.abs() < f64::EPSILON);
    assert!((Assessment::new(Verdict::Suspicious, f64::NAN, "x").score - NEUTRAL_SCORE).abs() < f64::EPSILON);

    let fallback = Assessment::uncertain("model offline");
    assert_eq!(fallback.verdict, Verdict::Uncertain);
    assert!((fallback.score - 0.5).abs() < f64::EPSILON);
}

#[test]
fn record_change_omits_payload_for_deletes() {
    let change = RecordChange::new("announcements", ChangeAction::Delete, "a1", None);
    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value["action"], "delete");
    assert!(value.get("record").is_none());
}
