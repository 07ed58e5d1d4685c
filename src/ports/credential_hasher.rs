//! Credential hashing port.
//!
//! Passwords are only ever stored as one-way hashes. The port keeps the
//! hashing algorithm out of the application handlers.

use crate::domain::foundation::AuthError;

/// One-way password hashing.
///
/// Both operations are CPU bound; implementations are synchronous.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` for a mismatch; `Err` only when the stored hash
    /// itself is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError>;
}
