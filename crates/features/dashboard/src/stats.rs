use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use axum::Json;
use brgy_database::Query as RowQuery;
use brgy_domain::constants::{ANNOUNCEMENTS, DASHBOARD_TAG, EMERGENCIES, REPORTS, USERS};
use brgy_domain::records::{AccountType, EmergencyStatus, ReportStatus, VerificationStatus};
use brgy_identity::Caller;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Headline counts for the dashboard landing screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub pending_reports: u64,
    pub active_emergencies: u64,
    pub pending_verifications: u64,
    pub published_announcements: u64,
    /// Report totals per status; statuses without reports are reported as zero.
    pub reports_by_status: BTreeMap<String, u64>,
}

impl Dashboard {
    pub(crate) async fn stats(&self) -> Result<DashboardStats, DashboardError> {
        let pending_reports = self
            .db
            .count(REPORTS, &RowQuery::new().filter("status", ReportStatus::Pending.as_str()))
            .await
            .context("Counting pending reports")?;
        let active_emergencies = self
            .db
            .count(EMERGENCIES, &RowQuery::new().filter("status", EmergencyStatus::Active.as_str()))
            .await
            .context("Counting active emergencies")?;
        let pending_verifications = self
            .db
            .count(
                USERS,
                &RowQuery::new()
                    .filter("account_type", AccountType::Resident.as_str())
                    .filter("verification_status", VerificationStatus::Pending.as_str()),
            )
            .await
            .context("Counting pending verifications")?;
        let published_announcements = self
            .db
            .count(ANNOUNCEMENTS, &RowQuery::new().filter("published", true))
            .await
            .context("Counting published announcements")?;

        let mut reports_by_status: BTreeMap<String, u64> =
            ReportStatus::ALL.iter().map(|status| (status.as_str().to_owned(), 0)).collect();
        for group in self.db.count_by(REPORTS, "status").await.context("Grouping reports")? {
            if let Some(status) = group.key {
                *reports_by_status.entry(status).or_default() += group.count;
            }
        }

        Ok(DashboardStats {
            pending_reports,
            active_emergencies,
            pending_verifications,
            published_announcements,
            reports_by_status,
        })
    }
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = OK, description = "Dashboard counters", body = DashboardStats),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn stats(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(dashboard.stats().await?))
}
