use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when connectivity or health checks fail.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when root sign-in fails.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A unique index or record id is already taken.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Row content could not be converted to or from JSON.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Migration failures or invariant violations.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DatabaseError {
    /// Whether the error comes from a unique index or an existing record id.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Lifts unique-constraint violations reported by the engine into [`DatabaseError::Conflict`].
    pub(crate) fn classify(source: surrealdb::Error, context: impl Into<Cow<'static, str>>) -> Self {
        let message = source.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            Self::Conflict { message: message.into(), context: Some(context.into()) }
        } else {
            Self::Surreal { source, context: Some(context.into()) }
        }
    }
}

pub trait DatabaseErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DatabaseError>;
}

impl<T> DatabaseErrorExt<T> for Result<T, DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                DatabaseError::Validation { context: c, .. }
                | DatabaseError::Connection { context: c, .. }
                | DatabaseError::Auth { context: c, .. }
                | DatabaseError::Conflict { context: c, .. }
                | DatabaseError::Surreal { context: c, .. }
                | DatabaseError::Serialization { context: c, .. }
                | DatabaseError::Migration { context: c, .. }
                | DatabaseError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> DatabaseErrorExt<T> for Result<T, surrealdb::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DatabaseError> {
        self.map_err(|source| DatabaseError::Surreal { source, context: Some(context.into()) })
    }
}

impl<T> DatabaseErrorExt<T> for Result<T, serde_json::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DatabaseError> {
        self.map_err(|source| DatabaseError::Serialization { source, context: Some(context.into()) })
    }
}

impl From<surrealdb::Error> for DatabaseError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Surreal { source, context: None }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
