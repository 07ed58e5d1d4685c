//! Session identity as seen by the domain.
//!
//! A validated `token` cookie resolves to an `AuthenticatedUser`; the token
//! format stays behind the `SessionValidator` port.

use super::AccountId;
use thiserror::Error;

/// Account resolved from a session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: AccountId,
    /// Email carried in the session claims at login time.
    pub email: String,
}

impl AuthenticatedUser {
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Session and credential failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed token or bad signature.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Signing or hashing could not run.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }
}
