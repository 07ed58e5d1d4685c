//! Purchase aggregate.
//!
//! A purchase records one checkout attempt for one course by one account.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: `amount_minor` is stored as i64 paisa/cents so
//!   that the provider's `amount_total` is kept without rounding
//! - **Correlation by session**: `payment_id` holds the provider's checkout
//!   session id and is how webhooks find the purchase
//! - **No (account, course) uniqueness**: each checkout creates a new row

use crate::domain::catalog::{Course, MINOR_UNITS_PER_MAJOR};
use crate::domain::foundation::{
    AccountId, CourseId, DomainError, ErrorCode, PurchaseId, StateMachine, Timestamp,
    ValidationError,
};

use super::PurchaseStatus;

/// What `Purchase::complete` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Pending purchase moved to completed.
    Completed,
    /// Purchase was already completed; nothing changed.
    AlreadyCompleted,
}

/// Purchase ledger entry.
///
/// # Invariants
///
/// - `status` only ever moves `Pending -> Completed`
/// - `amount_minor` is never negative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub id: PurchaseId,
    pub course_id: CourseId,
    pub account_id: AccountId,
    pub amount_minor: i64,
    pub status: PurchaseStatus,
    /// Provider checkout session id. Set before the purchase is first saved.
    pub payment_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Purchase {
    /// Starts a pending purchase priced at the course's current price.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the price cannot be expressed in minor units.
    pub fn pending(course: &Course, account_id: AccountId) -> Result<Self, ValidationError> {
        let amount_minor = course.unit_amount().ok_or_else(|| {
            ValidationError::out_of_range(
                "course_price",
                1,
                i64::MAX / MINOR_UNITS_PER_MAJOR,
                course.price,
            )
        })?;

        let now = Timestamp::now();
        Ok(Self {
            id: PurchaseId::new(),
            course_id: course.id,
            account_id,
            amount_minor,
            status: PurchaseStatus::Pending,
            payment_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Records the provider session this purchase is paid through.
    pub fn attach_payment_session(&mut self, session_id: impl Into<String>) {
        self.payment_id = Some(session_id.into());
        self.updated_at = Timestamp::now();
    }

    /// Marks the purchase as paid.
    ///
    /// `amount_total` is the provider-reported total in minor units; when
    /// present (and not negative) it replaces the amount recorded at checkout.
    /// Completing an already completed purchase is a no-op so that webhook
    /// redelivery is harmless.
    pub fn complete(&mut self, amount_total: Option<i64>) -> Result<Completion, DomainError> {
        if self.status == PurchaseStatus::Completed {
            return Ok(Completion::AlreadyCompleted);
        }

        self.status = self
            .status
            .transition_to(PurchaseStatus::Completed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;

        if let Some(total) = amount_total.filter(|t| *t >= 0) {
            self.amount_minor = total;
        }
        self.updated_at = Timestamp::now();
        Ok(Completion::Completed)
    }

    pub fn is_completed(&self) -> bool {
        self.status == PurchaseStatus::Completed
    }

    /// Amount in major currency units, as shown to clients.
    pub fn amount(&self) -> f64 {
        self.amount_minor as f64 / MINOR_UNITS_PER_MAJOR as f64
    }
}
