//! Residents, admin accounts and responders.

use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use crate::support::{Change, body, paging, patch_document, query};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use brgy_database::Query as RowQuery;
use brgy_domain::constants::{ADMIN_USERS, DASHBOARD_TAG, RESPONDERS, USERS};
use brgy_domain::records::{
    AccountType, AdminUser, Responder, ResponderStatus, UserAccount, VerificationStatus,
};
use brgy_domain::roles::{Capabilities, ResponderType};
use brgy_identity::{Caller, Identity};
use brgy_kernel::security::resource::ResourceGuard;
use brgy_kernel::server::{ApiError, ErrorBody, Paging, Slice};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResidentQuery {
    #[param(inline)]
    pub verification_status: Option<VerificationStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResidentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AdminPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResponderQuery {
    #[param(inline)]
    pub responder_type: Option<ResponderType>,
    #[param(inline)]
    pub status: Option<ResponderStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/residents",
    params(ResidentQuery),
    responses(
        (status = OK, description = "Resident accounts, newest first", body = [UserAccount]),
        (status = BAD_REQUEST, description = "Unknown verification status", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_residents(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<ResidentQuery>, QueryRejection>,
) -> Result<Json<Vec<UserAccount>>, ApiError> {
    let params = query(params)?;
    let page = paging(params.limit, params.offset);

    let mut rows = RowQuery::new()
        .filter("account_type", AccountType::Resident.as_str())
        .limit(page.limit())
        .offset(page.offset());
    if let Some(status) = params.verification_status {
        rows = rows.filter("verification_status", status.as_str());
    }

    Ok(Json(dashboard.db.select_all(USERS, &rows).await.context("Listing residents")?))
}

#[utoipa::path(
    patch,
    path = "/residents/{id}",
    params(("id" = String, Path, description = "Resident (users row) id")),
    request_body = ResidentPatch,
    responses(
        (status = OK, description = "The updated resident", body = UserAccount),
        (status = BAD_REQUEST, description = "Empty patch or invalid status", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage residents", body = ErrorBody),
        (status = NOT_FOUND, description = "No such resident", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn update_resident(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Path(id): Path<String>,
    payload: Result<Json<ResidentPatch>, JsonRejection>,
) -> Result<Json<UserAccount>, ApiError> {
    caller.require(Capabilities::MANAGE_RESIDENTS)?;
    let id = ResourceGuard::verify(id, USERS)?;
    let patch = body(payload)?;
    let document = patch_document(&patch, false)?;

    let existing: UserAccount = dashboard.fetch(USERS, &id).await?;
    if existing.account_type != AccountType::Resident {
        return Err(DashboardError::not_found(USERS, &id).into());
    }

    let resident: UserAccount = dashboard.apply_patch(USERS, &id, document).await?;
    let details = serde_json::to_string(&patch).ok();
    dashboard.announce(&caller, Change::updated(USERS, &id, &resident), "resident.updated", details).await;
    Ok(Json(resident))
}

#[utoipa::path(
    get,
    path = "/admins",
    params(Paging),
    responses(
        (status = OK, description = "Admin accounts, newest first", body = [AdminUser]),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_admins(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<Paging>, QueryRejection>,
) -> Result<Json<Vec<AdminUser>>, ApiError> {
    let page = query(params)?;
    let rows = RowQuery::new().limit(page.limit()).offset(page.offset());
    Ok(Json(dashboard.db.select_all(ADMIN_USERS, &rows).await.context("Listing admins")?))
}

#[utoipa::path(
    patch,
    path = "/admins/{id}",
    params(("id" = String, Path, description = "Admin account id")),
    request_body = AdminPatch,
    responses(
        (status = OK, description = "The updated admin account", body = AdminUser),
        (status = BAD_REQUEST, description = "Empty patch or self-deactivation", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot manage accounts", body = ErrorBody),
        (status = NOT_FOUND, description = "No such admin", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn update_admin(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    Slice(identity): Slice<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<AdminPatch>, JsonRejection>,
) -> Result<Json<AdminUser>, ApiError> {
    caller.require(Capabilities::MANAGE_ACCOUNTS)?;
    let id = ResourceGuard::verify(id, ADMIN_USERS)?;
    let patch = body(payload)?;
    let document = patch_document(&patch, false)?;

    if patch.is_active == Some(false) && id == caller.admin.id {
        return Err(DashboardError::validation("You cannot deactivate your own account").into());
    }

    let admin: AdminUser = dashboard.apply_patch(ADMIN_USERS, &id, document).await?;
    identity.invalidate(&admin.auth_id).await;
    info!(admin_id = %admin.id, is_active = admin.is_active, "Admin account updated");

    let action = if admin.is_active { "admin.activated" } else { "admin.deactivated" };
    dashboard.announce(&caller, Change::updated(ADMIN_USERS, &id, &admin), action, None).await;
    Ok(Json(admin))
}

#[utoipa::path(
    get,
    path = "/responders",
    params(ResponderQuery),
    responses(
        (status = OK, description = "Responders, newest first", body = [Responder]),
        (status = BAD_REQUEST, description = "Unknown responder type or status", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn list_responders(
    _caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<ResponderQuery>, QueryRejection>,
) -> Result<Json<Vec<Responder>>, ApiError> {
    let params = query(params)?;
    let page = paging(params.limit, params.offset);

    let mut rows = RowQuery::new().limit(page.limit()).offset(page.offset());
    if let Some(kind) = params.responder_type {
        rows = rows.filter("responder_type", kind.as_str());
    }
    if let Some(status) = params.status {
        rows = rows.filter("status", status.as_str());
    }

    Ok(Json(dashboard.db.select_all(RESPONDERS, &rows).await.context("Listing responders")?))
}
