//! Stripe Checkout behind the `PaymentProvider` port.
//!
//! Webhook payloads are accepted only with a valid `Stripe-Signature`
//! (HMAC-SHA256 over `"{t}.{body}"`, compared in constant time, five minute
//! tolerance on `t`).

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
pub use webhook_types::{
    hex_encode, signature_header, SignatureError, SignatureHeader, StripeCheckoutSession,
    StripeWebhookEvent, FUTURE_SKEW_SECS, SIGNATURE_TOLERANCE_SECS,
};
