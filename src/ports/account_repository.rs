//! Account repository port.
//!
//! Defines the contract for persisting and retrieving Account aggregates.
//!
//! # Design
//!
//! - **Unique email**: `save` fails with `EmailTaken` when the address is in use
//! - **Set semantics**: `add_enrolled_course` is a single idempotent write so
//!   concurrent webhook deliveries cannot duplicate an enrollment

use crate::domain::account::{Account, EmailAddress};
use crate::domain::foundation::{AccountId, CourseId, DomainError};
use async_trait::async_trait;

/// Repository port for Account persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Save a newly registered account.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if another account uses the email
    /// - `DatabaseError` on persistence failure
    async fn save(&self, account: &Account) -> Result<(), DomainError>;

    /// Persist profile changes (name, photo).
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, account: &Account) -> Result<(), DomainError>;

    /// Find an account by ID, including its enrolled courses.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Find an account by normalized email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError>;

    /// Add a course to the account's enrolled set.
    ///
    /// Returns true if the enrollment was new.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn add_enrolled_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError>;
}
