use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Validates a path id against the table it is used with and returns the bare id.
    ///
    /// Accepts `"abc"` or `"reports:abc"` for `expected_table = "reports"`. An id that names a
    /// different table (e.g. `"admin_users:abc"` on a report route) is rejected, as is an empty
    /// id or one containing characters outside `[A-Za-z0-9_-]`.
    ///
    /// # Errors
    /// Returns [`ResourceGuardError::Validation`] for mismatched tables and malformed ids.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref().trim();
        let table_ref = expected_table.as_ref();

        let bare = match id_ref.split_once(':') {
            Some((table, _)) if table != table_ref => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{table_ref}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            }
            Some((_, bare)) => bare,
            None => id_ref,
        };

        if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ResourceGuardError::Validation {
                message: format!("Malformed id '{id_ref}'").into(),
                context: Some(table_ref.to_owned().into()),
            });
        }

        Ok(bare.to_owned())
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_verification() {
        assert_eq!(ResourceGuard::verify("reports:abc123", "reports").unwrap(), "abc123");
        assert_eq!(ResourceGuard::verify("abc123", "reports").unwrap(), "abc123");
        assert!(ResourceGuard::verify("admin_users:abc", "reports").is_err());
    }
}
