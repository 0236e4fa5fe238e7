use crate::Identity;
use crate::error::IdentityError;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use brgy_domain::records::AdminUser;
use brgy_domain::roles::{AdminRole, Capabilities};
use brgy_kernel::security::bearer::bearer_token;
use brgy_kernel::server::{ApiError, ApiState};
use serde::Serialize;
use utoipa::ToSchema;

/// An authenticated, active admin making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity_id: String,
    pub email: String,
    pub admin: AdminUser,
}

impl Caller {
    /// Capabilities of the caller's role; inactive accounts have none.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        if self.admin.is_active { self.admin.role.capabilities() } else { Capabilities::empty() }
    }

    #[must_use]
    pub const fn can(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    /// # Errors
    /// Returns [`IdentityError::Forbidden`] when the role lacks `capability`.
    pub fn require(&self, capability: Capabilities) -> Result<(), IdentityError> {
        if self.can(capability) {
            return Ok(());
        }
        Err(IdentityError::Forbidden {
            message: format!("Requires {}", capability.names().join(", ")).into(),
            context: Some(self.admin.role.as_str().into()),
        })
    }
}

/// `GET /auth/me` response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CallerView {
    pub identity_id: String,
    pub email: String,
    pub admin_id: String,
    pub full_name: String,
    pub role: AdminRole,
    pub capabilities: Vec<String>,
}

impl From<&Caller> for CallerView {
    fn from(caller: &Caller) -> Self {
        Self {
            identity_id: caller.identity_id.clone(),
            email: caller.email.clone(),
            admin_id: caller.admin.id.clone(),
            full_name: caller.admin.full_name.clone(),
            role: caller.admin.role,
            capabilities: caller.capabilities().names(),
        }
    }
}

/// A [`Caller`] re-read from the database, bypassing the caller cache.
#[derive(Debug, Clone)]
pub struct FreshCaller(pub Caller);

fn token_from(parts: &Parts) -> Result<&str, IdentityError> {
    bearer_token(&parts.headers).ok_or_else(|| IdentityError::Unauthorized {
        message: "Missing bearer token".into(),
        context: None,
    })
}

impl FromRequestParts<ApiState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let identity = state.try_get_slice::<Identity>()?;
        let token = token_from(parts)?;
        Ok(identity.resolve(token).await?)
    }
}

impl FromRequestParts<ApiState> for FreshCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let identity = state.try_get_slice::<Identity>()?;
        let token = token_from(parts)?;
        Ok(Self(identity.resolve_fresh(token).await?))
    }
}

/// `Option<Caller>`: `None` without an `Authorization` header. A token that is present but
/// invalid, or that does not belong to an active admin, is still rejected.
impl OptionalFromRequestParts<ApiState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(None);
        }
        <Self as FromRequestParts<ApiState>>::from_request_parts(parts, state).await.map(Some)
    }
}
