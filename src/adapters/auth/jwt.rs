//! HS256 JWT session tokens.
//!
//! Implements both `SessionIssuer` and `SessionValidator`: login issues a
//! signed token carrying the account id, and the auth middleware validates
//! it on every protected request. No server-side session state is kept.
//!
//! # Claims
//!
//! - `sub`: account id (UUID)
//! - `email`: account email at issue time
//! - `iat` / `exp`: issue and expiry time (Unix seconds)

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, AuthError, AuthenticatedUser};
use crate::ports::{IssuedSession, SessionIssuer, SessionValidator};

/// Claims carried in a session token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates HS256-signed session tokens.
pub struct JwtSessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtSessionService {
    /// Create a service signing with `secret`; tokens live for `ttl_secs`.
    pub fn new(secret: &SecretString, ttl_secs: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl_secs,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    fn issue_at(
        &self,
        account_id: &AccountId,
        email: &str,
        issued_at: i64,
    ) -> Result<IssuedSession, AuthError> {
        let claims = SessionClaims {
            sub: account_id.to_string(),
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign session token");
                AuthError::service_unavailable("Failed to sign session token")
            })?;

        Ok(IssuedSession {
            token,
            max_age_secs: self.ttl_secs,
        })
    }
}

impl SessionIssuer for JwtSessionService {
    fn issue(&self, account_id: &AccountId, email: &str) -> Result<IssuedSession, AuthError> {
        self.issue_at(account_id, email, chrono::Utc::now().timestamp())
    }
}

#[async_trait]
impl SessionValidator for JwtSessionService {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Session token expired");
                        AuthError::TokenExpired
                    }
                    _ => {
                        tracing::debug!(error = %e, "Session token rejected");
                        AuthError::InvalidToken
                    }
                }
            })?;

        let account_id: AccountId = data.claims.sub.parse().map_err(|_| {
            tracing::warn!("Session token subject is not an account id");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(account_id, data.claims.email))
    }
}
