//! HandlePaymentWebhookHandler - Command handler for payment provider webhooks.
//!
//! Only `checkout.session.completed` is acted on. Completing a purchase
//! unlocks the course's lectures and records the enrollment on both the
//! account and the course. Redelivery of the same event converges on the
//! same state because every step is idempotent.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, CourseId, PurchaseId};
use crate::domain::purchase::{Completion, PurchaseError};
use crate::ports::{
    AccountRepository, CourseRepository, PaymentProvider, PurchaseRepository, WebhookEventData,
    WebhookEventType,
};

/// Command carrying the raw webhook request.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Value of the `Stripe-Signature` header, empty when absent.
    pub signature: String,
}

/// Outcome of webhook processing.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlePaymentWebhookResult {
    /// The purchase moved to completed and access was granted.
    PurchaseCompleted {
        purchase_id: PurchaseId,
        course_id: CourseId,
        account_id: AccountId,
        lectures_unlocked: u64,
    },

    /// The purchase was already completed; access grants were re-applied.
    AlreadyCompleted {
        purchase_id: PurchaseId,
        course_id: CourseId,
        account_id: AccountId,
    },

    /// Event type the application does not act on.
    Ignored { event_type: String },
}

/// Handler for payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    purchases: Arc<dyn PurchaseRepository>,
    courses: Arc<dyn CourseRepository>,
    accounts: Arc<dyn AccountRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        purchases: Arc<dyn PurchaseRepository>,
        courses: Arc<dyn CourseRepository>,
        accounts: Arc<dyn AccountRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            purchases,
            courses,
            accounts,
            payment_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, PurchaseError> {
        // 1. Authenticate the payload before looking at it
        let event = self
            .payment_provider
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected payment webhook");
                PurchaseError::from(e)
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type.as_str(),
            "Received payment webhook"
        );

        match event.event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                self.handle_checkout_completed(event.data).await
            }
            WebhookEventType::Unknown(event_type) => {
                tracing::debug!(event_type = %event_type, "Ignoring payment webhook");
                Ok(HandlePaymentWebhookResult::Ignored { event_type })
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        data: WebhookEventData,
    ) -> Result<HandlePaymentWebhookResult, PurchaseError> {
        let (session_id, amount_total, metadata_course_id) = match data {
            WebhookEventData::Checkout {
                session_id,
                amount_total,
                course_id,
                ..
            } => (session_id, amount_total, course_id),
            WebhookEventData::Raw { .. } => {
                return Err(PurchaseError::validation(
                    "data",
                    "Checkout event carried no session",
                ));
            }
        };

        // 2. Correlate with the pending purchase
        let mut purchase = self
            .purchases
            .find_by_payment_id(&session_id)
            .await?
            .ok_or_else(|| PurchaseError::purchase_not_found(&session_id))?;

        if let Some(metadata_course_id) = metadata_course_id {
            if metadata_course_id != purchase.course_id.to_string() {
                tracing::warn!(
                    session_id = %session_id,
                    purchase_course_id = %purchase.course_id,
                    metadata_course_id = %metadata_course_id,
                    "Checkout metadata disagrees with purchase; trusting the purchase"
                );
            }
        }

        let course = self
            .courses
            .find_by_id(&purchase.course_id)
            .await?
            .ok_or_else(|| {
                PurchaseError::infrastructure(format!(
                    "Course {} referenced by purchase {} is missing",
                    purchase.course_id, purchase.id
                ))
            })?;

        // 3. Transition; redelivery is a no-op here
        let completion = purchase.complete(amount_total)?;

        // 4. Completing any purchase unlocks every lecture of the course
        let lectures_unlocked = if course.has_lectures() {
            self.courses.unlock_lectures(&course.id).await?
        } else {
            0
        };

        // 5. Persist before granting enrollment
        if completion == Completion::Completed {
            self.purchases.update(&purchase).await?;
        }

        // 6. Enrollment on both sides; repeated adds are no-ops
        let account_added = self
            .accounts
            .add_enrolled_course(&purchase.account_id, &purchase.course_id)
            .await?;
        let student_added = self
            .courses
            .add_enrolled_student(&purchase.course_id, &purchase.account_id)
            .await?;

        tracing::info!(
            purchase_id = %purchase.id,
            course_id = %purchase.course_id,
            account_id = %purchase.account_id,
            lectures_unlocked,
            account_added,
            student_added,
            "Processed checkout completion"
        );

        Ok(match completion {
            Completion::Completed => HandlePaymentWebhookResult::PurchaseCompleted {
                purchase_id: purchase.id,
                course_id: purchase.course_id,
                account_id: purchase.account_id,
                lectures_unlocked,
            },
            Completion::AlreadyCompleted => HandlePaymentWebhookResult::AlreadyCompleted {
                purchase_id: purchase.id,
                course_id: purchase.course_id,
                account_id: purchase.account_id,
            },
        })
    }
}
