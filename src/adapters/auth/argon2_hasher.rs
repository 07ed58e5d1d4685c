//! Argon2id credential hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::domain::foundation::AuthError;
use crate::ports::CredentialHasher;

/// Hashes passwords into PHC strings (`$argon2id$v=19$...`) with default
/// Argon2id parameters and a random salt per hash.
#[derive(Debug, Default, Clone)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to hash password");
                AuthError::service_unavailable("Failed to hash password")
            })
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is unreadable");
            AuthError::service_unavailable("Stored password hash is unreadable")
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
