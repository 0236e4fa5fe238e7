use std::borrow::Cow;

/// Audit slice error type.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Audit store error{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: brgy_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Audit error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait AuditErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, AuditError>;
}

impl<T> AuditErrorExt<T> for Result<T, brgy_database::DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, AuditError> {
        self.map_err(|source| AuditError::Store { source, context: Some(context.into()) })
    }
}

impl From<AuditError> for brgy_kernel::server::ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Store { source, .. } => source.into(),
            AuditError::Internal { .. } => {
                tracing::error!(error = %err, "Audit failure");
                Self::internal("Audit log unavailable")
            }
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
