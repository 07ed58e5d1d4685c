//! RegisterHandler - Command handler for creating an account.

use std::sync::Arc;

use super::with_hasher;
use crate::domain::account::{Account, AccountError, EmailAddress};
use crate::ports::{AccountRepository, CredentialHasher};

/// Command to register a new account.
///
/// Fields are raw client input; absent fields arrive as empty strings.
#[derive(Debug, Clone, Default)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub account: Account,
}

/// Handler for account registration.
pub struct RegisterHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl RegisterHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { accounts, hasher }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterResult, AccountError> {
        if cmd.name.trim().is_empty() || cmd.email.trim().is_empty() || cmd.password.trim().is_empty() {
            return Err(AccountError::MissingFields);
        }

        let email = EmailAddress::parse(&cmd.email)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password = cmd.password;
        let password_hash = with_hasher(&self.hasher, move |h| h.hash(&password)).await?;

        let account = Account::register(&cmd.name, email, password_hash)?;

        // A concurrent registration can still win the race; the store's
        // uniqueness check reports it as EmailTaken.
        self.accounts.save(&account).await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(RegisterResult { account })
    }
}
