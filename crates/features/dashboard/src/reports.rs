use crate::Dashboard;
use crate::error::DashboardErrorExt;
use crate::support::{Change, body, paging, patch_document, query};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use brgy_database::Query as RowQuery;
use brgy_domain::constants::{DASHBOARD_TAG, REPORTS};
use brgy_domain::records::{Report, ReportStatus};
use brgy_domain::roles::Capabilities;
use brgy_identity::Caller;
use brgy_kernel::security::resource::ResourceGuard;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[param(inline)]
    pub status: Option<ReportStatus>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responder_notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/reports",
    params(ReportQuery),
    responses(
        (status = OK, description = "Reports, newest first", body = [Report]),
        (status = BAD_REQUEST, description = "Unknown status filter", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_reports(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let params = query(params)?;
    let page = paging(params.limit, params.offset);

    let mut rows = RowQuery::new().limit(page.limit()).offset(page.offset());
    if let Some(status) = params.status {
        rows = rows.filter("status", status.as_str());
    }
    if let Some(category) = params.category.filter(|c| !c.trim().is_empty()) {
        rows = rows.filter("category", category);
    }

    let reports = dashboard.db.select_all(REPORTS, &rows).await.context("Listing reports")?;
    Ok(Json(reports))
}

#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = OK, description = "The report", body = Report),
        (status = NOT_FOUND, description = "No such report", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn get_report(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    let id = ResourceGuard::verify(id, REPORTS)?;
    Ok(Json(dashboard.fetch(REPORTS, &id).await?))
}

#[utoipa::path(
    patch,
    path = "/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    request_body = ReportPatch,
    responses(
        (status = OK, description = "The updated report", body = Report),
        (status = BAD_REQUEST, description = "Empty patch or invalid status", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage reports", body = ErrorBody),
        (status = NOT_FOUND, description = "No such report", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn update_report(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
    payload: Result<Json<ReportPatch>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
    caller.require(Capabilities::MANAGE_REPORTS)?;
    let id = ResourceGuard::verify(id, REPORTS)?;
    let patch = body(payload)?;
    let document = patch_document(&patch, true)?;

    let report: Report = dashboard.apply_patch(REPORTS, &id, document).await?;
    let details = patch.status.map(|status| format!("status={status}"));
    dashboard.announce(&caller, Change::updated(REPORTS, &id, &report), "report.updated", details).await;
    Ok(Json(report))
}
