use crate::Audit;
use crate::store::AuditFilter;
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use brgy_domain::constants::AUDIT_TAG;
use brgy_domain::records::AuditLog;
use brgy_domain::roles::Capabilities;
use brgy_identity::Caller;
use brgy_kernel::server::{ApiError, ErrorBody, Paging, Slice};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Table name the entries touched.
    pub entity: Option<String>,
    /// Admin id that performed the action.
    pub actor_id: Option<String>,
    /// Page size; defaults to 50 and is capped at 200.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/audit-logs",
    params(AuditQuery),
    responses(
        (status = OK, description = "Audit entries, newest first", body = [AuditLog]),
        (status = BAD_REQUEST, description = "Malformed query parameters", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
        (status = FORBIDDEN, description = "Role cannot view the audit log", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = AUDIT_TAG,
)]
pub(crate) async fn list_audit_logs(
    caller: Caller,
    Slice(audit): Slice<Audit>,
    params: Result<Query<AuditQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    caller.require(Capabilities::VIEW_AUDIT)?;
    let Query(query) =
        params.map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))?;

    let paging = Paging { limit: query.limit, offset: query.offset };
    let filter = AuditFilter {
        entity: query.entity.filter(|e| !e.trim().is_empty()),
        actor_id: query.actor_id.filter(|a| !a.trim().is_empty()),
        limit: paging.limit(),
        offset: paging.offset(),
    };
    Ok(Json(audit.trail.list(&filter).await?))
}
