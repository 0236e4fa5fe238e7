//! Email/password identities backed by the `auth_identities` table.
//!
//! Passwords are hashed and compared inside the engine with argon2; hashes never leave it.

use crate::Database;
use crate::error::{DatabaseError, DatabaseErrorExt};
use tracing::instrument;

const IDENTITIES_TABLE: &str = "auth_identities";

/// Lower-cased, trimmed form under which emails are stored and looked up.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Database {
    /// Registers a new identity under `id`.
    ///
    /// # Errors
    /// * [`DatabaseError::Conflict`] if the email (or id) is already registered.
    /// * [`DatabaseError::Surreal`] for engine failures.
    #[instrument(skip(self, password))]
    pub async fn create_identity(
        &self,
        id: &str,
        email: &str,
        password: &str,
    ) -> Result<(), DatabaseError> {
        self.query(
            "CREATE type::thing($table, $id) SET
                email = $email,
                password_hash = crypto::argon2::generate($password),
                created_at = <string> time::now()
            RETURN NONE",
        )
        .bind(("table", IDENTITIES_TABLE))
        .bind(("id", id.to_owned()))
        .bind(("email", normalize_email(email)))
        .bind(("password", password.to_owned()))
        .await
        .context("Creating identity")?
        .check()
        .map_err(|e| DatabaseError::classify(e, "Creating identity"))?;
        Ok(())
    }

    /// Returns the identity id when `email` exists and `password` matches its hash.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the lookup fails.
    #[instrument(skip(self, password))]
    pub async fn verify_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let ids = self
            .query(
                "SELECT VALUE record::id(id) FROM type::table($table)
                WHERE email = $email AND crypto::argon2::compare(password_hash, $password)",
            )
            .bind(("table", IDENTITIES_TABLE))
            .bind(("email", normalize_email(email)))
            .bind(("password", password.to_owned()))
            .await
            .context("Verifying identity")?
            .take::<Vec<String>>(0)
            .context("Verifying identity")?;
        Ok(ids.into_iter().next())
    }

    /// Removes an identity. Returns whether it existed.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the statement fails.
    pub async fn delete_identity(&self, id: &str) -> Result<bool, DatabaseError> {
        self.delete(IDENTITIES_TABLE, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Kap.Santos@Barangay.PH "), "kap.santos@barangay.ph");
    }
}
