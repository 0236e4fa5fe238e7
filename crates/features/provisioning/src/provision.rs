use crate::directory::AccountDirectory;
use crate::error::ProvisioningError;
use crate::request::{AccountKind, NewAccount};
use crate::saga::{Saga, Undo};
use brgy_domain::changes::{ChangeAction, RecordChange};
use brgy_domain::constants::{ADMIN_USERS, RESPONDERS};
use brgy_domain::records::{
    AccountType, AdminUser, Responder, ResponderStatus, UserAccount, VerificationStatus,
};
use brgy_kernel::safe_nanoid;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a completed provisioning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioned {
    pub auth_id: String,
    /// Id of the admin row, or of the linked `users` row for responders.
    pub user_id: String,
    /// Table and row of the account record.
    pub table: &'static str,
    pub row_id: String,
    /// Insert announcement for the change feed, carrying the new row.
    pub change: RecordChange,
}

#[derive(Debug, Clone)]
pub struct Provisioner {
    directory: Arc<dyn AccountDirectory>,
}

impl Provisioner {
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Creates the auth identity and the rows linked to it.
    ///
    /// # Errors
    /// * [`ProvisioningError::Conflict`] when the email is already registered.
    /// * [`ProvisioningError::Step`] naming the failed step, after completed steps were undone.
    #[instrument(skip(self, account), fields(email = %account.email, user_type = %account.kind.user_type()))]
    pub async fn provision(&self, account: &NewAccount) -> Result<Provisioned, ProvisioningError> {
        let directory = self.directory.as_ref();
        let mut saga = Saga::new(directory);
        let auth_id = safe_nanoid!();

        if let Err(e) = directory.create_identity(&auth_id, &account.email, &account.password).await {
            if e.is_conflict() {
                return Err(ProvisioningError::Conflict {
                    message: "email already registered".into(),
                    context: Some(account.email.clone().into()),
                });
            }
            return Err(saga.abort("create auth identity", e).await);
        }
        saga.completed(Undo::DeleteIdentity(auth_id.clone()));

        let provisioned = match account.kind {
            AccountKind::Admin(role) => {
                let admin = AdminUser {
                    id: safe_nanoid!(),
                    auth_id: auth_id.clone(),
                    full_name: account.full_name.clone(),
                    email: account.email.clone(),
                    role,
                    is_active: true,
                    created_at: Utc::now(),
                };
                if let Err(e) = directory.insert_admin(&admin).await {
                    return Err(saga.abort("insert admin row", e).await);
                }
                Provisioned {
                    auth_id,
                    user_id: admin.id.clone(),
                    table: ADMIN_USERS,
                    row_id: admin.id.clone(),
                    change: RecordChange::with_row(ADMIN_USERS, ChangeAction::Insert, &admin.id, &admin),
                }
            }
            AccountKind::Responder(responder_type) => {
                let now = Utc::now();
                let user = UserAccount {
                    id: auth_id.clone(),
                    auth_id: Some(auth_id.clone()),
                    full_name: account.full_name.clone(),
                    email: account.email.clone(),
                    phone: None,
                    address: None,
                    account_type: AccountType::Responder,
                    verification_status: VerificationStatus::Verified,
                    is_active: true,
                    created_at: now,
                };
                if let Err(e) = directory.upsert_user(&user).await {
                    return Err(saga.abort("upsert user row", e).await);
                }
                saga.completed(Undo::DeleteUser(user.id.clone()));

                let responder = Responder {
                    id: safe_nanoid!(),
                    user_id: user.id.clone(),
                    auth_id: auth_id.clone(),
                    full_name: account.full_name.clone(),
                    email: account.email.clone(),
                    responder_type,
                    status: ResponderStatus::Available,
                    created_at: now,
                };
                if let Err(e) = directory.insert_responder(&responder).await {
                    return Err(saga.abort("insert responder row", e).await);
                }
                Provisioned {
                    auth_id,
                    user_id: user.id,
                    table: RESPONDERS,
                    row_id: responder.id.clone(),
                    change: RecordChange::with_row(
                        RESPONDERS,
                        ChangeAction::Insert,
                        &responder.id,
                        &responder,
                    ),
                }
            }
        };

        info!(auth_id = %provisioned.auth_id, table = provisioned.table, "Account provisioned");
        Ok(provisioned)
    }
}
