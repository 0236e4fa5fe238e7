use crate::Provisioning;
use crate::request::{CreateAccountRequest, CreateAccountResponse};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use brgy_audit::AuditEntry;
use brgy_domain::constants::FUNCTIONS_TAG;
use brgy_domain::roles::Capabilities;
use brgy_identity::FreshCaller;
use brgy_kernel::changes::publish_change;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};

#[utoipa::path(
    post,
    path = "/functions/create-admin",
    request_body = CreateAccountRequest,
    responses(
        (status = CREATED, description = "Account provisioned", body = CreateAccountResponse),
        (status = BAD_REQUEST, description = "Missing or invalid field", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
        (status = FORBIDDEN, description = "Caller may not provision accounts", body = ErrorBody),
        (status = CONFLICT, description = "Email already registered", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "A step failed and was rolled back", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = FUNCTIONS_TAG,
)]
pub(crate) async fn create_account(
    FreshCaller(caller): FreshCaller,
    Slice(provisioning): Slice<Provisioning>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    caller.require(Capabilities::MANAGE_ACCOUNTS)?;

    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;
    let account = request.validate()?;

    let provisioned = provisioning.provisioner.provision(&account).await?;

    publish_change(&provisioning.events, provisioned.change);
    provisioning
        .audit
        .record(
            AuditEntry::new("account.created", provisioned.table)
                .entity_id(&provisioned.row_id)
                .by(&caller)
                .details(format!("{} {} <{}>", account.kind.user_type(), account.kind.role(), account.email)),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            success: true,
            user_id: provisioned.user_id,
            auth_id: provisioned.auth_id,
        }),
    ))
}
