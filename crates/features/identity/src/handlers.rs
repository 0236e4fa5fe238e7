use crate::Identity;
use crate::caller::{Caller, CallerView};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use brgy_domain::constants::AUTH_TAG;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = OK, description = "Bearer token issued", body = TokenResponse),
        (status = BAD_REQUEST, description = "Missing email or password", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Wrong credentials", body = ErrorBody),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn sign_in(
    Slice(identity): Slice<Identity>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let issued = identity.sign_in(&request.email, &request.password).await?;
    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "Bearer".to_owned(),
        expires_in: issued.expires_in,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = OK, description = "The authenticated admin", body = CallerView),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
        (status = FORBIDDEN, description = "Not an active admin", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn me(caller: Caller) -> Json<CallerView> {
    Json(CallerView::from(&caller))
}
