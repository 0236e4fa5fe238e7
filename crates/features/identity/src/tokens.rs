//! HS256 bearer tokens.

use crate::error::{IdentityError, IdentityErrorExt};
use brgy_domain::config::JwtConfig;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const MIN_SECRET_LEN: usize = 16;

/// Claims carried by every access token. `sub` is the auth identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Signs and verifies access tokens with the configured shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: Option<String>,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    /// Returns [`IdentityError::Config`] for secrets shorter than 16 bytes or a zero TTL.
    pub fn new(config: &JwtConfig) -> Result<Self, IdentityError> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(IdentityError::Config {
                message: format!("JWT secret must be at least {MIN_SECRET_LEN} bytes").into(),
                context: None,
            });
        }
        if config.ttl_seconds == 0 {
            return Err(IdentityError::Config {
                message: "JWT ttl_seconds must be greater than zero".into(),
                context: None,
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;
        validation.set_issuer(&[config.issuer.as_str()]);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    /// Issues a token for an authenticated identity.
    ///
    /// # Errors
    /// Returns [`IdentityError::Token`] if signing fails.
    pub fn issue(&self, identity_id: &str, email: &str) -> Result<IssuedToken, IdentityError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX / 2);
        let claims = Claims {
            sub: identity_id.to_owned(),
            email: email.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        Ok(IssuedToken { access_token: self.sign(&claims)?, expires_in: self.ttl_seconds })
    }

    /// Checks signature, issuer, audience and expiry (with the configured leeway).
    ///
    /// # Errors
    /// Returns [`IdentityError::Token`] for any invalid token.
    pub fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)
            .context("Verifying access token")?
            .claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, IdentityError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).context("Signing access token")
    }
}
