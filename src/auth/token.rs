//! Bearer token verification.
//!
//! # Responsibilities
//! - Parse the `Authorization` header
//! - Verify the HMAC signature and registered claims of the token
//! - Map verified claims into an [`Identity`]
//!
//! # Design Decisions
//! - Purely local: no call to the identity service
//! - The secret is read from configuration once and held in a `DecodingKey`
//! - Nothing is cached; every request verifies its own token

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::auth::identity::{Claims, Identity};
use crate::config::AuthConfig;

/// Delimiter between the prefix text and the token.
const BEARER: &str = "Bearer";

/// Reasons a credential is refused. All of them surface as `401`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid credential format")]
    InvalidFormat,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Verifies bearer tokens against the shared secret.
pub struct TokenAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        if !config.require_expiry {
            validation.required_spec_claims.clear();
        }

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Authenticate using the `Authorization` header of a request.
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        match headers.get(AUTHORIZATION) {
            None => Err(AuthError::Unauthenticated),
            Some(value) => {
                let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;
                self.authenticate(value)
            }
        }
    }

    /// Authenticate a raw `Authorization` header value.
    ///
    /// The value must contain exactly one `Bearer` delimiter; whatever
    /// follows it, trimmed, is the token.
    pub fn authenticate(&self, header: &str) -> Result<Identity, AuthError> {
        if header.is_empty() {
            return Err(AuthError::Unauthenticated);
        }

        let segments: Vec<&str> = header.split(BEARER).collect();
        if segments.len() != 2 {
            return Err(AuthError::InvalidFormat);
        }

        let token = segments[1].trim();
        if token.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidCredentials
        })?;

        Ok(data.claims.into())
    }
}
