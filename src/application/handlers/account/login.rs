//! LoginHandler - Command handler for credential login.

use std::sync::Arc;

use super::with_hasher;
use crate::domain::account::{Account, AccountError, EmailAddress};
use crate::ports::{AccountRepository, CredentialHasher, IssuedSession, SessionIssuer};

/// Command to log in with email and password.
#[derive(Debug, Clone, Default)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub account: Account,
    pub session: IssuedSession,
}

/// Handler for credential login.
///
/// Unknown emails and wrong passwords fail with the same error so the
/// response does not reveal which accounts exist.
pub struct LoginHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn CredentialHasher>,
    sessions: Arc<dyn SessionIssuer>,
}

impl LoginHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn CredentialHasher>,
        sessions: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            sessions,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginResult, AccountError> {
        if cmd.email.trim().is_empty() || cmd.password.is_empty() {
            return Err(AccountError::MissingFields);
        }

        let email = EmailAddress::parse(&cmd.email).map_err(|_| AccountError::InvalidCredentials)?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let password = cmd.password;
        let stored_hash = account.password_hash.clone();
        let matches = with_hasher(&self.hasher, move |h| h.verify(&password, &stored_hash)).await?;
        if !matches {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        let session = self
            .sessions
            .issue(&account.id, account.email.as_str())
            .map_err(|e| AccountError::infrastructure(format!("Failed to issue session: {}", e)))?;

        tracing::info!(account_id = %account.id, "Account logged in");

        Ok(LoginResult { account, session })
    }
}
