//! CreateCheckoutSessionHandler - Command handler for starting a course checkout.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, CourseId};
use crate::domain::purchase::{Purchase, PurchaseError};
use crate::ports::{CheckoutLineItem, CourseRepository, CreateCheckoutRequest, PaymentProvider, PurchaseRepository};

/// Deployment settings that shape every checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Front-end origin the provider redirects back to.
    pub client_url: String,
    /// Lowercase ISO currency code.
    pub currency: String,
    /// Countries accepted for the shipping address.
    pub allowed_countries: Vec<String>,
}

impl CheckoutSettings {
    fn success_url(&self, course_id: &CourseId) -> String {
        format!("{}/course-progress/{}", self.client_url.trim_end_matches('/'), course_id)
    }

    fn cancel_url(&self, course_id: &CourseId) -> String {
        format!("{}/course-detail/{}", self.client_url.trim_end_matches('/'), course_id)
    }
}

/// Command to start a checkout for one course.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub account_id: AccountId,
    /// Course id as supplied by the client.
    pub course_id: String,
}

/// Result of a successfully started checkout.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionResult {
    /// The pending purchase, already persisted.
    pub purchase: Purchase,
    /// Hosted checkout page to redirect the buyer to.
    pub checkout_url: String,
}

/// Handler for starting a course checkout.
///
/// Creates a pending purchase priced at the course's current price and a
/// hosted checkout session for it. The purchase is completed later by the
/// payment webhook.
pub struct CreateCheckoutSessionHandler {
    courses: Arc<dyn CourseRepository>,
    purchases: Arc<dyn PurchaseRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        purchases: Arc<dyn PurchaseRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            courses,
            purchases,
            payment_provider,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, PurchaseError> {
        // 1. Load the course; an unparseable id cannot name a course
        let course_id: CourseId = cmd
            .course_id
            .trim()
            .parse()
            .map_err(|_| PurchaseError::course_not_found(&cmd.course_id))?;

        let course = self
            .courses
            .find_by_id(&course_id)
            .await?
            .ok_or_else(|| PurchaseError::course_not_found(&cmd.course_id))?;

        // 2. Pending purchase at the current price
        let mut purchase = Purchase::pending(&course, cmd.account_id)?;

        // 3. Hosted checkout session
        let session = self
            .payment_provider
            .create_checkout_session(CreateCheckoutRequest {
                course_id: course.id,
                account_id: cmd.account_id,
                line_item: CheckoutLineItem {
                    name: course.title.clone(),
                    image_url: course.thumbnail_url.clone(),
                    unit_amount: purchase.amount_minor,
                    quantity: 1,
                },
                currency: self.settings.currency.clone(),
                success_url: self.settings.success_url(&course.id),
                cancel_url: self.settings.cancel_url(&course.id),
                allowed_countries: self.settings.allowed_countries.clone(),
            })
            .await?;

        // 4. A session without a redirect URL is useless; persist nothing
        let Some(checkout_url) = session.url else {
            tracing::warn!(
                session_id = %session.id,
                course_id = %course.id,
                "Checkout session created without a URL"
            );
            return Err(PurchaseError::SessionUrlMissing);
        };

        // 5. Correlate and persist
        purchase.attach_payment_session(&session.id);
        self.purchases.save(&purchase).await?;

        tracing::info!(
            purchase_id = %purchase.id,
            course_id = %course.id,
            account_id = %cmd.account_id,
            session_id = %session.id,
            amount_minor = purchase.amount_minor,
            "Checkout session started"
        );

        Ok(CreateCheckoutSessionResult {
            purchase,
            checkout_url,
        })
    }
}
