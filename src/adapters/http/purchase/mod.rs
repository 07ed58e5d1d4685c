//! HTTP adapter for purchase endpoints.
//!
//! - `POST /api/v1/purchase/checkout/create-checkout-session` - Start checkout
//! - `POST /api/v1/purchase/webhook` - Payment provider webhook
//! - `GET /api/v1/purchase/course/:course_id/detail-with-status` - Course detail
//! - `GET /api/v1/purchase` - Completed purchases

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{PurchaseApiError, PurchaseAppState, WebhookApiError, SIGNATURE_HEADER};
pub use routes::purchase_router;
