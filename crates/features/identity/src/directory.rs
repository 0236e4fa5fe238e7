use crate::error::{IdentityError, IdentityErrorExt};
use async_trait::async_trait;
use brgy_database::Database;
use brgy_domain::constants::ADMIN_USERS;
use brgy_domain::records::AdminUser;
use std::fmt::Debug;

/// Where credentials are checked and admin accounts are looked up.
#[async_trait]
pub trait CallerDirectory: Debug + Send + Sync {
    /// Returns the identity id when the credentials match.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, IdentityError>;

    /// The admin account linked to an auth identity, if any.
    async fn admin_by_auth_id(&self, auth_id: &str) -> Result<Option<AdminUser>, IdentityError>;
}

#[derive(Debug, Clone)]
pub struct SurrealCallerDirectory {
    db: Database,
}

impl SurrealCallerDirectory {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CallerDirectory for SurrealCallerDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, IdentityError> {
        self.db.verify_identity(email, password).await.context("Checking credentials")
    }

    async fn admin_by_auth_id(&self, auth_id: &str) -> Result<Option<AdminUser>, IdentityError> {
        self.db
            .find_first(ADMIN_USERS, "auth_id", auth_id)
            .await
            .context(format!("Loading admin account for {auth_id}"))
    }
}
