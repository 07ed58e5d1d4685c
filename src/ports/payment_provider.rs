//! Hosted checkout and webhook authentication.
//!
//! Nothing here names gateway wire fields. `verify_webhook` is the only
//! constructor handlers see for a [`WebhookEvent`], so an unauthenticated
//! payload never reaches the purchase ledger.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{AccountId, CourseId};
use crate::domain::purchase::PurchaseError;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a one-time payment session for a single course.
    ///
    /// A session without a URL is possible; callers treat it as a failure.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Authenticates `payload` against its signature header and decodes it.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError>;
}

/// The single priced line shown on the hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub image_url: Option<String>,
    /// Minor currency units.
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Echoed back as `courseId` metadata.
    pub course_id: CourseId,
    /// Echoed back as `userId` metadata.
    pub account_id: AccountId,
    pub line_item: CheckoutLineItem,
    /// Lowercase ISO 4217, e.g. `pkr`.
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Shipping countries offered on the hosted page.
    pub allowed_countries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session id; becomes the purchase's payment id.
    pub id: String,
    /// Where the buyer is redirected to pay.
    pub url: Option<String>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

/// An authenticated gateway notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: WebhookEventType,
    pub data: WebhookEventData,
    /// Unix seconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    CheckoutSessionCompleted,
    /// Acknowledged and ignored.
    Unknown(String),
}

impl WebhookEventType {
    const CHECKOUT_COMPLETED: &'static str = "checkout.session.completed";

    pub fn from_provider(event_type: &str) -> Self {
        if event_type == Self::CHECKOUT_COMPLETED {
            Self::CheckoutSessionCompleted
        } else {
            Self::Unknown(event_type.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => Self::CHECKOUT_COMPLETED,
            Self::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookEventData {
    Checkout {
        session_id: String,
        /// Minor units.
        amount_total: Option<i64>,
        course_id: Option<String>,
        account_id: Option<String>,
    },
    /// Undecoded `data.object` of an event we do not act on.
    Raw { json: String },
}

/// Failure talking to, or hearing from, the payment gateway.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Gateway's own error code, when it sent one.
    pub provider_code: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl From<PaymentError> for PurchaseError {
    fn from(err: PaymentError) -> Self {
        if err.code == PaymentErrorCode::InvalidWebhook {
            PurchaseError::InvalidWebhookSignature(err.message)
        } else {
            PurchaseError::PaymentProvider(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    /// Rejected API key.
    AuthenticationError,
    RateLimitExceeded,
    /// Bad signature, stale timestamp or undecodable body.
    InvalidWebhook,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkError | Self::RateLimitExceeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::AuthenticationError => "authentication_error",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::InvalidWebhook => "invalid_webhook",
            Self::ProviderError => "provider_error",
        }
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_can_be_used_as_object() {
        fn _takes(_: &dyn PaymentProvider) {}
    }

    #[test]
    fn checkout_completed_is_recognised() {
        let event_type = WebhookEventType::from_provider("checkout.session.completed");
        assert_eq!(event_type, WebhookEventType::CheckoutSessionCompleted);
        assert_eq!(event_type.as_str(), "checkout.session.completed");
    }

    #[test]
    fn other_event_types_keep_their_name() {
        let event_type = WebhookEventType::from_provider("payment_intent.created");
        assert_eq!(
            event_type,
            WebhookEventType::Unknown("payment_intent.created".to_string())
        );
        assert_eq!(event_type.as_str(), "payment_intent.created");
    }

    #[test]
    fn only_transient_failures_retry() {
        assert!(PaymentError::network("reset").is_retryable());
        assert!(PaymentError::new(PaymentErrorCode::RateLimitExceeded, "slow down").is_retryable());
        assert!(!PaymentError::invalid_webhook("bad sig").is_retryable());
        assert!(!PaymentError::provider("No such price").is_retryable());
    }

    #[test]
    fn message_is_prefixed_with_code() {
        let err = PaymentError::provider("No such price").with_provider_code("resource_missing");
        assert_eq!(err.to_string(), "provider_error: No such price");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn invalid_webhook_maps_to_signature_error() {
        let err: PurchaseError = PaymentError::invalid_webhook("Invalid signature").into();
        assert_eq!(
            err,
            PurchaseError::InvalidWebhookSignature("Invalid signature".to_string())
        );
    }

    #[test]
    fn transport_failure_maps_to_provider_error() {
        let err: PurchaseError = PaymentError::network("connection reset").into();
        assert!(matches!(err, PurchaseError::PaymentProvider(_)));
    }
}
