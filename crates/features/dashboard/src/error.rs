use brgy_kernel::server::ApiError;
use std::borrow::Cow;
use tracing::error;

/// Dashboard slice error type.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Store error{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: brgy_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Change feed error{}: {source}", format_context(.context))]
    Feed {
        #[source]
        source: brgy_event_bus::EventBusError,
        context: Option<Cow<'static, str>>,
    },
}

impl DashboardError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub(crate) fn not_found(table: &'static str, id: &str) -> Self {
        Self::NotFound { message: format!("No {table} row with id '{id}'").into(), context: None }
    }
}

pub trait DashboardErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DashboardError>;
}

impl<T> DashboardErrorExt<T> for Result<T, brgy_database::DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DashboardError> {
        self.map_err(|source| DashboardError::Store { source, context: Some(context.into()) })
    }
}

impl<T> DashboardErrorExt<T> for Result<T, brgy_event_bus::EventBusError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DashboardError> {
        self.map_err(|source| DashboardError::Feed { source, context: Some(context.into()) })
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Validation { message, .. } => Self::bad_request(message),
            DashboardError::NotFound { message, .. } => Self::not_found(message),
            DashboardError::Store { source, context } => {
                if let Some(context) = context {
                    error!(%context, "Dashboard store operation failed");
                }
                source.into()
            }
            DashboardError::Feed { .. } => {
                error!(error = %err, "Change feed unavailable");
                Self::internal("Change feed unavailable")
            }
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
