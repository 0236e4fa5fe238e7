use std::borrow::Cow;

/// Failures inside the assessment pipeline. None of them reach the HTTP caller: the
/// assessor folds every variant into an `uncertain` verdict.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    /// The model endpoint is not usable (e.g. no API key configured).
    #[error("Model not configured{}: {message}", format_context(.context))]
    NotConfigured { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Model request failed{}: {source}", format_context(.context))]
    Transport {
        #[source]
        source: reqwest::Error,
        context: Option<Cow<'static, str>>,
    },

    /// The endpoint answered with a non-success status.
    #[error("Model returned an error status{}: {message}", format_context(.context))]
    Status { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The completion was empty or did not contain a usable verdict object.
    #[error("Unparsable model response{}: {message}", format_context(.context))]
    Parse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Evidence write-back failed{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: brgy_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal evidence error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait EvidenceErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EvidenceError>;
}

impl<T> EvidenceErrorExt<T> for Result<T, reqwest::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EvidenceError> {
        self.map_err(|source| EvidenceError::Transport { source, context: Some(context.into()) })
    }
}

impl<T> EvidenceErrorExt<T> for Result<T, brgy_database::DatabaseError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EvidenceError> {
        self.map_err(|source| EvidenceError::Store { source, context: Some(context.into()) })
    }
}

impl From<reqwest::Error> for EvidenceError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport { source, context: None }
    }
}

impl From<brgy_database::DatabaseError> for EvidenceError {
    fn from(source: brgy_database::DatabaseError) -> Self {
        Self::Store { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
