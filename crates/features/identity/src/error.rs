use axum::http::StatusCode;
use brgy_kernel::server::ApiError;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`IdentityError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Configuration errors for identity/authentication.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No usable credentials: missing, malformed, expired or wrong.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Valid credentials that do not grant the requested access.
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token error{}: {source}", format_context(.context))]
    Token {
        #[source]
        source: jsonwebtoken::errors::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Identity store error{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: brgy_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait IdentityErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError>;
}

impl<T> IdentityErrorExt<T> for Result<T, jsonwebtoken::errors::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError> {
        self.map_err(|source| IdentityError::Token { source, context: Some(context.into()) })
    }
}

impl<T> IdentityErrorExt<T> for Result<T, brgy_database::DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError> {
        self.map_err(|source| IdentityError::Store { source, context: Some(context.into()) })
    }
}

impl From<brgy_database::DatabaseError> for IdentityError {
    fn from(source: brgy_database::DatabaseError) -> Self {
        Self::Store { source, context: None }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unauthorized { message, .. } => Self::unauthorized(message),
            IdentityError::Token { .. } => Self::unauthorized("Invalid or expired token"),
            IdentityError::Forbidden { message, .. } => Self::forbidden(message),
            other => {
                error!(error = %other, "Identity resolution failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Identity service unavailable")
            }
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
