use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use crate::support::{Change, body, paging, patch_document, query};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use brgy_database::Query as RowQuery;
use brgy_domain::constants::{DASHBOARD_TAG, EMERGENCIES, RESPONDERS};
use brgy_domain::records::{Emergency, EmergencyStatus, Responder};
use brgy_domain::roles::Capabilities;
use brgy_identity::Caller;
use brgy_kernel::security::resource::ResourceGuard;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmergencyQuery {
    #[param(inline)]
    pub status: Option<EmergencyStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EmergencyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmergencyStatus>,
    /// Responder assigned to the emergency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responder_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/emergencies",
    params(EmergencyQuery),
    responses(
        (status = OK, description = "Emergencies, newest first", body = [Emergency]),
        (status = BAD_REQUEST, description = "Unknown status filter", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_emergencies(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<EmergencyQuery>, QueryRejection>,
) -> Result<Json<Vec<Emergency>>, ApiError> {
    let params = query(params)?;
    let page = paging(params.limit, params.offset);

    let mut rows = RowQuery::new().limit(page.limit()).offset(page.offset());
    if let Some(status) = params.status {
        rows = rows.filter("status", status.as_str());
    }

    let emergencies = dashboard.db.select_all(EMERGENCIES, &rows).await.context("Listing emergencies")?;
    Ok(Json(emergencies))
}

#[utoipa::path(
    get,
    path = "/emergencies/{id}",
    params(("id" = String, Path, description = "Emergency id")),
    responses(
        (status = OK, description = "The emergency", body = Emergency),
        (status = NOT_FOUND, description = "No such emergency", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn get_emergency(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
) -> Result<Json<Emergency>, ApiError> {
    let id = ResourceGuard::verify(id, EMERGENCIES)?;
    Ok(Json(dashboard.fetch(EMERGENCIES, &id).await?))
}

#[utoipa::path(
    patch,
    path = "/emergencies/{id}",
    params(("id" = String, Path, description = "Emergency id")),
    request_body = EmergencyPatch,
    responses(
        (status = OK, description = "The updated emergency", body = Emergency),
        (status = BAD_REQUEST, description = "Empty patch, invalid status or unknown responder", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage emergencies", body = ErrorBody),
        (status = NOT_FOUND, description = "No such emergency", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn update_emergency(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
    payload: Result<Json<EmergencyPatch>, JsonRejection>,
) -> Result<Json<Emergency>, ApiError> {
    caller.require(Capabilities::MANAGE_EMERGENCIES)?;
    let id = ResourceGuard::verify(id, EMERGENCIES)?;
    let mut patch = body(payload)?;

    if let Some(raw) = patch.responder_id.take() {
        let responder_id = ResourceGuard::verify(raw, RESPONDERS)?;
        let known = dashboard
            .db
            .select_one::<Responder>(RESPONDERS, &responder_id)
            .await
            .context("Checking assigned responder")?
            .is_some();
        if !known {
            return Err(DashboardError::validation(format!("Unknown responder '{responder_id}'")).into());
        }
        patch.responder_id = Some(responder_id);
    }

    let document = patch_document(&patch, true)?;
    let emergency: Emergency = dashboard.apply_patch(EMERGENCIES, &id, document).await?;
    let details = serde_json::to_string(&patch).ok();
    dashboard
        .announce(&caller, Change::updated(EMERGENCIES, &id, &emergency), "emergency.updated", details)
        .await;
    Ok(Json(emergency))
}
