//! Identity slice: password sign-in, HS256 bearer tokens and caller resolution.
//!
//! A request's bearer token resolves to the active admin account linked to its identity.
//! Resolutions are cached briefly (`security.identity.cache_*`); [`FreshCaller`] skips the cache
//! for decisions that must see the latest role and status.

mod caller;
mod directory;
mod error;
mod handlers;
mod tokens;

pub use crate::caller::{Caller, CallerView, FreshCaller};
pub use crate::directory::{CallerDirectory, SurrealCallerDirectory};
pub use crate::error::{IdentityError, IdentityErrorExt};
pub use crate::handlers::{SignInRequest, TokenResponse};
pub use crate::tokens::{Claims, IssuedToken, TokenService};

use brgy_database::Database;
use brgy_domain::config::IdentityConfig;
use brgy_domain::registry::{FeatureSlice, InitializedSlice};
use brgy_kernel::server::ApiState;
use moka::future::Cache;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[derive(Debug)]
pub struct IdentityInner {
    pub tokens: TokenService,
    pub directory: Arc<dyn CallerDirectory>,
    cache: Cache<String, Caller>,
}

/// Identity slice state.
#[derive(Debug, Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

impl Identity {
    /// # Errors
    /// Returns [`IdentityError::Config`] for an unusable JWT configuration.
    pub fn new(config: &IdentityConfig, directory: Arc<dyn CallerDirectory>) -> Result<Self, IdentityError> {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds.max(1)))
            .build();
        let tokens = TokenService::new(&config.jwt)?;
        Ok(Self { inner: Arc::new(IdentityInner { tokens, directory, cache }) })
    }

    /// Checks credentials and issues an access token.
    ///
    /// # Errors
    /// Returns [`IdentityError::Unauthorized`] for unknown emails or wrong passwords.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError> {
        let identity_id = self.directory.verify_credentials(email, password).await?.ok_or(
            IdentityError::Unauthorized { message: "Invalid email or password".into(), context: None },
        )?;
        debug!(%identity_id, "Credentials accepted");
        self.tokens.issue(&identity_id, &brgy_database::normalize_email(email))
    }

    /// Resolves a bearer token to its admin, serving repeated lookups from the cache.
    ///
    /// # Errors
    /// * [`IdentityError::Token`] for invalid or expired tokens.
    /// * [`IdentityError::Forbidden`] when the identity is not an active admin.
    pub async fn resolve(&self, token: &str) -> Result<Caller, IdentityError> {
        let claims = self.tokens.verify(token)?;
        if let Some(caller) = self.cache.get(&claims.sub).await {
            return Ok(caller);
        }
        let caller = self.lookup(claims).await?;
        self.cache.insert(caller.identity_id.clone(), caller.clone()).await;
        Ok(caller)
    }

    /// Like [`Identity::resolve`], but always reads the account from the directory.
    ///
    /// # Errors
    /// See [`Identity::resolve`].
    pub async fn resolve_fresh(&self, token: &str) -> Result<Caller, IdentityError> {
        let claims = self.tokens.verify(token)?;
        let identity_id = claims.sub.clone();
        match self.lookup(claims).await {
            Ok(caller) => {
                self.cache.insert(identity_id, caller.clone()).await;
                Ok(caller)
            }
            Err(e) => {
                self.cache.invalidate(&identity_id).await;
                Err(e)
            }
        }
    }

    /// Drops a cached resolution, e.g. after the account was deactivated.
    pub async fn invalidate(&self, identity_id: &str) {
        self.cache.invalidate(identity_id).await;
    }

    async fn lookup(&self, claims: Claims) -> Result<Caller, IdentityError> {
        let admin = self.directory.admin_by_auth_id(&claims.sub).await?.ok_or_else(|| {
            IdentityError::Forbidden { message: "Not an admin account".into(), context: None }
        })?;
        if !admin.is_active {
            return Err(IdentityError::Forbidden {
                message: "Admin account is inactive".into(),
                context: None,
            });
        }
        Ok(Caller { identity_id: claims.sub, email: claims.email, admin })
    }
}

impl Deref for Identity {
    type Target = IdentityInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Initialize the identity slice backed by the database.
///
/// # Errors
/// Returns [`IdentityError::Config`] for an unusable JWT configuration.
pub fn init(config: &IdentityConfig, database: &Database) -> Result<InitializedSlice, IdentityError> {
    let slice = Identity::new(config, Arc::new(SurrealCallerDirectory::new(database.clone())))?;
    tracing::info!(
        issuer = %config.jwt.issuer,
        cache_ttl_seconds = config.cache_ttl_seconds,
        "Identity slice initialized"
    );
    Ok(InitializedSlice::new(slice))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::sign_in)).routes(routes!(handlers::me))
}
