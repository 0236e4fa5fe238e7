use crate::error::{ProvisioningError, ProvisioningErrorExt};
use async_trait::async_trait;
use brgy_database::Database;
use brgy_domain::constants::{ADMIN_USERS, RESPONDERS, USERS};
use brgy_domain::records::{AdminUser, Responder, UserAccount};
use std::fmt::Debug;

/// Account storage used by provisioning.
///
/// The identity and `users` row can be deleted again for rollback. Admin and responder
/// rows are the last write of their path, so nothing after them needs undoing.
#[async_trait]
pub trait AccountDirectory: Debug + Send + Sync {
    /// # Errors
    /// A conflict ([`ProvisioningError::is_conflict`]) when the email is already registered.
    async fn create_identity(&self, id: &str, email: &str, password: &str) -> Result<(), ProvisioningError>;
    async fn delete_identity(&self, id: &str) -> Result<bool, ProvisioningError>;

    async fn insert_admin(&self, admin: &AdminUser) -> Result<(), ProvisioningError>;

    /// Inserts or replaces the `users` row, so a row pre-created for the identity is reused.
    async fn upsert_user(&self, user: &UserAccount) -> Result<(), ProvisioningError>;
    async fn delete_user(&self, id: &str) -> Result<bool, ProvisioningError>;

    async fn insert_responder(&self, responder: &Responder) -> Result<(), ProvisioningError>;
}

#[derive(Debug, Clone)]
pub struct SurrealAccountDirectory {
    db: Database,
}

impl SurrealAccountDirectory {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountDirectory for SurrealAccountDirectory {
    async fn create_identity(&self, id: &str, email: &str, password: &str) -> Result<(), ProvisioningError> {
        self.db.create_identity(id, email, password).await.context("Creating auth identity")
    }

    async fn delete_identity(&self, id: &str) -> Result<bool, ProvisioningError> {
        self.db.delete_identity(id).await.context("Deleting auth identity")
    }

    async fn insert_admin(&self, admin: &AdminUser) -> Result<(), ProvisioningError> {
        self.db.create(ADMIN_USERS, &admin.id, admin).await.context("Inserting admin row")
    }

    async fn upsert_user(&self, user: &UserAccount) -> Result<(), ProvisioningError> {
        self.db.upsert(USERS, &user.id, user).await.context("Upserting user row")
    }

    async fn delete_user(&self, id: &str) -> Result<bool, ProvisioningError> {
        self.db.delete(USERS, id).await.context("Deleting user row")
    }

    async fn insert_responder(&self, responder: &Responder) -> Result<(), ProvisioningError> {
        self.db.create(RESPONDERS, &responder.id, responder).await.context("Inserting responder row")
    }
}
