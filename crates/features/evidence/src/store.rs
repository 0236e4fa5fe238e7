use crate::error::{EvidenceError, EvidenceErrorExt};
use async_trait::async_trait;
use brgy_database::Database;
use brgy_domain::constants::REPORTS;
use brgy_domain::evidence::Assessment;
use brgy_domain::records::Report;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::fmt::Debug;

/// Persists assessment results onto report rows.
#[async_trait]
pub trait EvidenceStore: Debug + Send + Sync {
    /// Merges the verdict into the report. Returns the updated row, or `None` if it does not exist.
    async fn record_assessment(
        &self,
        report_id: &str,
        assessment: &Assessment,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Report>, EvidenceError>;
}

#[derive(Debug, Clone)]
pub struct SurrealEvidenceStore {
    db: Database,
}

impl SurrealEvidenceStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EvidenceStore for SurrealEvidenceStore {
    async fn record_assessment(
        &self,
        report_id: &str,
        assessment: &Assessment,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Report>, EvidenceError> {
        let patch = json!({
            "evidence_verdict": assessment.verdict,
            "evidence_score": assessment.score,
            "evidence_explanation": assessment.explanation,
            "evidence_checked_at": checked_at,
        });

        self.db.merge(REPORTS, report_id, patch).await.context(format!("Updating report {report_id}"))
    }
}
