use axum::http::StatusCode;
use brgy_kernel::server::ApiError;
use std::borrow::Cow;
use tracing::error;

/// Provisioning slice error type.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Directory error{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: brgy_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// A step failed after earlier steps were (possibly only partly) rolled back.
    #[error("{message}{}", format_context(.context))]
    Step { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ProvisioningError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Store { source, .. } => source.is_conflict(),
            _ => false,
        }
    }
}

pub trait ProvisioningErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ProvisioningError>;
}

impl<T> ProvisioningErrorExt<T> for Result<T, brgy_database::DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ProvisioningError> {
        self.map_err(|source| ProvisioningError::Store { source, context: Some(context.into()) })
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Validation { message, .. } => Self::bad_request(message),
            ProvisioningError::Conflict { message, .. } => Self::conflict(message),
            ProvisioningError::Step { message, .. } => Self::internal(message),
            ProvisioningError::Store { .. } => {
                error!(error = %err, "Provisioning store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Account directory unavailable")
            }
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
