//! Axum router configuration for purchase endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout_session, get_course_detail_with_status, handle_payment_webhook,
    list_completed_purchases, PurchaseAppState,
};

/// Create the purchase API router, mounted at `/api/v1/purchase`.
///
/// # Routes
///
/// ## Authenticated
/// - `POST /checkout/create-checkout-session` - Start a hosted checkout
/// - `GET /course/:course_id/detail-with-status` - Course detail with purchase status
///
/// ## Public
/// - `GET /` - Completed purchases
///
/// ## Webhook (signature verified, no session)
/// - `POST /webhook` - Payment provider events
pub fn purchase_router() -> Router<PurchaseAppState> {
    Router::new()
        .route("/", get(list_completed_purchases))
        .route(
            "/checkout/create-checkout-session",
            post(create_checkout_session),
        )
        .route(
            "/course/:course_id/detail-with-status",
            get(get_course_detail_with_status),
        )
        .route("/webhook", post(handle_payment_webhook))
}
