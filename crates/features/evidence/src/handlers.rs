use crate::Evidence;
use crate::report::AssessRequest;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use brgy_domain::changes::{ChangeAction, RecordChange};
use brgy_domain::constants::{FUNCTIONS_TAG, REPORTS};
use brgy_domain::evidence::Assessment;
use brgy_domain::roles::Capabilities;
use brgy_identity::Caller;
use brgy_kernel::changes::publish_change;
use brgy_kernel::security::resource::ResourceGuard;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use chrono::Utc;
use tracing::{debug, warn};

#[utoipa::path(
    post,
    path = "/functions/assess-evidence",
    request_body = AssessRequest,
    responses(
        (status = OK, description = "Verdict for the report's evidence", body = Assessment),
        (status = BAD_REQUEST, description = "Missing or malformed body", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Bearer token present but invalid", body = ErrorBody),
    ),
    tag = FUNCTIONS_TAG,
)]
pub(crate) async fn assess_evidence(
    Slice(evidence): Slice<Evidence>,
    caller: Option<Caller>,
    payload: Result<Json<AssessRequest>, JsonRejection>,
) -> Result<Json<Assessment>, ApiError> {
    let Json(AssessRequest { report }) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;

    let assessment = evidence.assessor.assess(&report).await;

    if let Some(raw_id) = report.id.as_deref().filter(|id| !id.trim().is_empty()) {
        // Only admins who manage reports may change a stored report.
        if caller.as_ref().is_some_and(|c| c.can(Capabilities::MANAGE_REPORTS)) {
            write_back(&evidence, raw_id, &assessment).await;
        } else {
            debug!(report_id = %raw_id, "Assessment returned without write-back");
        }
    }

    Ok(Json(assessment))
}

async fn write_back(evidence: &Evidence, raw_id: &str, assessment: &Assessment) {
    let id = match ResourceGuard::verify(raw_id, REPORTS) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Skipping evidence write-back for malformed report id");
            return;
        }
    };

    match evidence.store.record_assessment(&id, assessment, Utc::now()).await {
        Ok(Some(report)) => publish_change(
            &evidence.events,
            RecordChange::with_row(REPORTS, ChangeAction::Update, &id, &report),
        ),
        Ok(None) => warn!(report_id = %id, "Report not found; assessment not stored"),
        Err(e) => warn!(error = %e, report_id = %id, "Failed to store evidence assessment"),
    }
}
