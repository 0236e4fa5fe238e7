use crate::error::ProvisioningError;
use brgy_database::normalize_email;
use brgy_domain::roles::{AdminRole, ResponderType, UserType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_PASSWORD_LEN: usize = 8;

/// `POST /functions/create-admin` body. Missing fields deserialize as blank and fail validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateAccountRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    /// An admin role for `admin`, a responder type for `responder`.
    pub role: String,
    /// `admin` or `responder`.
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountResponse {
    pub success: bool,
    pub user_id: String,
    pub auth_id: String,
}

/// What kind of account to create, with its role already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Admin(AdminRole),
    Responder(ResponderType),
}

impl AccountKind {
    #[must_use]
    pub const fn user_type(self) -> UserType {
        match self {
            Self::Admin(_) => UserType::Admin,
            Self::Responder(_) => UserType::Responder,
        }
    }

    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::Admin(role) => role.as_str(),
            Self::Responder(kind) => kind.as_str(),
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub kind: AccountKind,
}

impl CreateAccountRequest {
    /// Checks every field before anything is written.
    ///
    /// # Errors
    /// Returns [`ProvisioningError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<NewAccount, ProvisioningError> {
        let fields = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("password", &self.password),
            ("role", &self.role),
            ("user_type", &self.user_type),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ProvisioningError::validation(format!("Field '{name}' is required")));
        }

        let email = normalize_email(&self.email);
        if !is_valid_email(&email) {
            return Err(ProvisioningError::validation("Email must look like name@domain.tld"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProvisioningError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user_type: UserType = self
            .user_type
            .parse()
            .map_err(|_| ProvisioningError::validation("user_type must be 'admin' or 'responder'"))?;
        let kind = match user_type {
            UserType::Admin => self.role.parse().map(AccountKind::Admin).map_err(|_| {
                ProvisioningError::validation(format!("'{}' is not an admin role", self.role.trim()))
            })?,
            UserType::Responder => self.role.parse().map(AccountKind::Responder).map_err(|_| {
                ProvisioningError::validation(format!("'{}' is not a responder type", self.role.trim()))
            })?,
        };

        Ok(NewAccount {
            full_name: self.full_name.trim().to_owned(),
            email,
            password: self.password.clone(),
            kind,
        })
    }
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain with text on both sides.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.rsplit_once('.').is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
