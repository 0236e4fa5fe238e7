use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brgy_database::DatabaseError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::error;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// An HTTP-facing failure: a status plus a client-safe message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message.into_owned() })).into_response()
    }
}

/// Storage failures surface as 409 for conflicts and an opaque 500 otherwise.
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_conflict() {
            return Self::conflict("Resource already exists");
        }
        error!(error = %err, "Database operation failed");
        Self::internal("Database operation failed")
    }
}

impl From<crate::security::resource::ResourceGuardError> for ApiError {
    fn from(err: crate::security::resource::ResourceGuardError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<super::state::ApiStateError> for ApiError {
    fn from(err: super::state::ApiStateError) -> Self {
        error!(error = %err, "Request state is incomplete");
        Self::internal("Service is not fully initialized")
    }
}
