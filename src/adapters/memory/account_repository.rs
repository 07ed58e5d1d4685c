//! In-memory account store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, EmailAddress};
use crate::domain::foundation::{AccountId, CourseId, DomainError, ErrorCode};
use crate::ports::AccountRepository;

/// In-memory storage for accounts
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

fn not_found(id: &AccountId) -> DomainError {
    DomainError::new(ErrorCode::AccountNotFound, format!("Account not found: {}", id))
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn save(&self, account: &Account) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|existing| existing.email == account.email && existing.id != account.id)
        {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                format!("Email already registered: {}", account.email),
            ));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(|| not_found(&account.id))?;

        // The enrollment set is owned by add_enrolled_course; profile updates
        // must not roll back a concurrent enrollment.
        let enrolled = std::mem::take(&mut stored.enrolled_courses);
        *stored = account.clone();
        stored.enrolled_courses = enrolled;
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| &account.email == email)
            .cloned())
    }

    async fn add_enrolled_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| not_found(account_id))?;
        Ok(account.enroll(*course_id))
    }
}
