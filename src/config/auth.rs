//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest accepted HS256 signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Authentication configuration (cookie sessions)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: SecretString,

    /// Session lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,

    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// In production the session cookie must be `Secure`.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ValidationError::JwtSecretTooShort(MIN_JWT_SECRET_BYTES));
        }
        if self.token_ttl_secs <= 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }

        if *environment == Environment::Production && !self.cookie_secure {
            return Err(ValidationError::InsecureCookieInProduction);
        }

        Ok(())
    }
}

fn default_token_ttl() -> i64 {
    24 * 60 * 60
}
