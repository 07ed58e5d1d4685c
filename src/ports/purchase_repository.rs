//! Purchase ledger port.
//!
//! # Design
//!
//! - **Correlation key**: `payment_id` (the provider session id) is unique and
//!   is how webhook notifications find their purchase
//! - **Append-mostly**: purchases are inserted once and updated only to
//!   complete them; nothing is deleted

use crate::domain::foundation::{AccountId, CourseId, DomainError};
use crate::domain::purchase::Purchase;
use async_trait::async_trait;

/// Repository port for Purchase persistence.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Insert a new purchase.
    ///
    /// # Errors
    ///
    /// - `DuplicatePaymentId` if another purchase has the same session id
    /// - `DatabaseError` on persistence failure
    async fn save(&self, purchase: &Purchase) -> Result<(), DomainError>;

    /// Persist status and amount changes.
    ///
    /// # Errors
    ///
    /// - `PurchaseNotFound` if the purchase doesn't exist
    async fn update(&self, purchase: &Purchase) -> Result<(), DomainError>;

    /// Find the purchase correlated with a checkout session.
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>, DomainError>;

    /// All purchases of a course by one account, newest first.
    async fn find_by_account_and_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> Result<Vec<Purchase>, DomainError>;

    /// All completed purchases, newest first.
    async fn find_completed(&self) -> Result<Vec<Purchase>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PurchaseRepository) {}
    }
}
