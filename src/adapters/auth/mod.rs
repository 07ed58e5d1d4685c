//! Authentication adapters.
//!
//! Implementations of the session and credential ports:
//!
//! - `jwt` - HS256 session tokens (`SessionIssuer` + `SessionValidator`)
//! - `argon2_hasher` - Argon2id password hashing (`CredentialHasher`)
//! - `mock` - Token-table validator for tests

mod argon2_hasher;
mod jwt;
mod mock;

pub use argon2_hasher::Argon2CredentialHasher;
pub use jwt::JwtSessionService;
pub use mock::MockSessionValidator;
