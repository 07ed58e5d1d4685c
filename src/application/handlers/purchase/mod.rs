//! Purchase handlers.
//!
//! ## Commands
//! - Starting a hosted checkout for a course
//! - Processing payment provider webhooks
//!
//! ## Queries
//! - Course detail with the caller's purchase status
//! - Completed purchases across all accounts

mod create_checkout_session;
mod get_course_detail;
mod handle_payment_webhook;
mod list_completed_purchases;

// Commands
pub use create_checkout_session::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};

// Queries
pub use get_course_detail::{GetCourseDetailHandler, GetCourseDetailQuery, GetCourseDetailResult};
pub use list_completed_purchases::{
    CompletedPurchase, ListCompletedPurchasesHandler, ListCompletedPurchasesQuery,
    ListCompletedPurchasesResult,
};
