//! Session credential ports.
//!
//! Login issues a session token that the browser returns in the `token`
//! cookie; middleware validates it on later requests. The token format is an
//! adapter concern.
//!
//! # Contract
//!
//! Implementations MUST reject tokens that are expired or whose signature does
//! not match, and MUST NOT accept a token issued for another secret.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, AuthError, AuthenticatedUser};

/// A freshly issued session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Opaque value placed in the session cookie.
    pub token: String,
    /// Lifetime of the token, used for the cookie's `Max-Age`.
    pub max_age_secs: i64,
}

/// Issues session credentials after a successful login.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, account_id: &AccountId, email: &str) -> Result<IssuedSession, AuthError>;
}

/// Validates session tokens and extracts the account identity.
///
/// # Returns
///
/// * `Ok(AuthenticatedUser)` - token is valid
/// * `Err(AuthError::InvalidToken)` - malformed or bad signature
/// * `Err(AuthError::TokenExpired)` - signature valid but expired
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
