//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers change state; query handlers only read.

pub mod handlers;

pub use handlers::account::{
    GetProfileHandler, GetProfileQuery, GetProfileResult, LoginCommand, LoginHandler,
    LoginResult, RegisterCommand, RegisterHandler, RegisterResult, UpdateProfileCommand,
    UpdateProfileHandler, UpdateProfileResult,
};
pub use handlers::purchase::{
    CheckoutSettings, CompletedPurchase, CreateCheckoutSessionCommand,
    CreateCheckoutSessionHandler, CreateCheckoutSessionResult, GetCourseDetailHandler,
    GetCourseDetailQuery, GetCourseDetailResult, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, ListCompletedPurchasesHandler,
    ListCompletedPurchasesQuery, ListCompletedPurchasesResult,
};
