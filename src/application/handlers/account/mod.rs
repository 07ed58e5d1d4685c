//! Account handlers.
//!
//! ## Commands
//! - Registration and login
//! - Profile update (name and photo)
//!
//! ## Queries
//! - Profile with enrolled courses

mod get_profile;
mod login;
mod register;
mod update_profile;

// Commands
pub use login::{LoginCommand, LoginHandler, LoginResult};
pub use register::{RegisterCommand, RegisterHandler, RegisterResult};
pub use update_profile::{UpdateProfileCommand, UpdateProfileHandler, UpdateProfileResult};

// Queries
pub use get_profile::{GetProfileHandler, GetProfileQuery, GetProfileResult};

use std::sync::Arc;

use crate::domain::account::AccountError;
use crate::domain::foundation::AuthError;
use crate::ports::CredentialHasher;

/// Runs a hashing operation on the blocking pool; Argon2 is CPU bound.
async fn with_hasher<T, F>(hasher: &Arc<dyn CredentialHasher>, op: F) -> Result<T, AccountError>
where
    T: Send + 'static,
    F: FnOnce(&dyn CredentialHasher) -> Result<T, AuthError> + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || op(hasher.as_ref()))
        .await
        .map_err(|e| AccountError::infrastructure(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AccountError::infrastructure(e.to_string()))
}
