//! In-memory purchase ledger.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AccountId, CourseId, DomainError, ErrorCode};
use crate::domain::purchase::Purchase;
use crate::ports::PurchaseRepository;

/// In-memory purchase ledger, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryPurchaseRepository {
    purchases: Arc<RwLock<Vec<Purchase>>>,
}

impl InMemoryPurchaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored purchase, oldest first
    pub async fn all(&self) -> Vec<Purchase> {
        self.purchases.read().await.clone()
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn save(&self, purchase: &Purchase) -> Result<(), DomainError> {
        let mut purchases = self.purchases.write().await;
        if let Some(payment_id) = &purchase.payment_id {
            if purchases
                .iter()
                .any(|p| p.payment_id.as_ref() == Some(payment_id))
            {
                return Err(DomainError::new(
                    ErrorCode::DuplicatePaymentId,
                    format!("Payment id already recorded: {}", payment_id),
                ));
            }
        }
        purchases.push(purchase.clone());
        Ok(())
    }

    async fn update(&self, purchase: &Purchase) -> Result<(), DomainError> {
        let mut purchases = self.purchases.write().await;
        let stored = purchases
            .iter_mut()
            .find(|p| p.id == purchase.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PurchaseNotFound,
                    format!("Purchase not found: {}", purchase.id),
                )
            })?;
        *stored = purchase.clone();
        Ok(())
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>, DomainError> {
        Ok(self
            .purchases
            .read()
            .await
            .iter()
            .find(|p| p.payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    async fn find_by_account_and_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> Result<Vec<Purchase>, DomainError> {
        Ok(self
            .purchases
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| &p.account_id == account_id && &p.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_completed(&self) -> Result<Vec<Purchase>, DomainError> {
        Ok(self
            .purchases
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| p.is_completed())
            .cloned()
            .collect())
    }
}
