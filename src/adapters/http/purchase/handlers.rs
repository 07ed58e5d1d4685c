//! HTTP handlers for purchase endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::dto::ErrorResponse;
use crate::adapters::http::extract::ApiJson;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::purchase::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    GetCourseDetailHandler, GetCourseDetailQuery, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, ListCompletedPurchasesHandler, ListCompletedPurchasesQuery,
};
use crate::domain::purchase::PurchaseError;
use crate::ports::{AccountRepository, CourseRepository, PaymentProvider, PurchaseRepository};

use super::dto::{
    CheckoutSessionResponse, CourseDetailResponse, CreateCheckoutSessionRequest,
    PurchaseResponse, PurchasedCoursesResponse, WebhookErrorResponse,
};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for purchase endpoints.
#[derive(Clone)]
pub struct PurchaseAppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub checkout: CheckoutSettings,
}

impl PurchaseAppState {
    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.courses.clone(),
            self.purchases.clone(),
            self.payment_provider.clone(),
            self.checkout.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.purchases.clone(),
            self.courses.clone(),
            self.accounts.clone(),
            self.payment_provider.clone(),
        )
    }

    pub fn course_detail_handler(&self) -> GetCourseDetailHandler {
        GetCourseDetailHandler::new(
            self.courses.clone(),
            self.accounts.clone(),
            self.purchases.clone(),
        )
    }

    pub fn completed_purchases_handler(&self) -> ListCompletedPurchasesHandler {
        ListCompletedPurchasesHandler::new(self.purchases.clone(), self.courses.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/purchase/checkout/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<PurchaseAppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CreateCheckoutSessionRequest>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let cmd = CreateCheckoutSessionCommand {
        account_id: user.id,
        course_id: request.course_id.unwrap_or_default(),
    };

    let result = state.checkout_handler().handle(cmd).await?;

    Ok(Json(CheckoutSessionResponse {
        success: true,
        url: result.checkout_url,
    }))
}

/// POST /api/v1/purchase/webhook
///
/// Takes the raw body: the signature covers the exact bytes received.
pub async fn handle_payment_webhook(
    State(state): State<PurchaseAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.webhook_handler().handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/v1/purchase/course/{courseId}/detail-with-status
pub async fn get_course_detail_with_status(
    State(state): State<PurchaseAppState>,
    RequireAuth(user): RequireAuth,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let query = GetCourseDetailQuery {
        account_id: user.id,
        course_id,
    };

    let result = state.course_detail_handler().handle(query).await?;

    Ok(Json(CourseDetailResponse::from(result)))
}

/// GET /api/v1/purchase
pub async fn list_completed_purchases(
    State(state): State<PurchaseAppState>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let result = state
        .completed_purchases_handler()
        .handle(ListCompletedPurchasesQuery)
        .await?;

    Ok(Json(PurchasedCoursesResponse {
        purchased_course: result.purchases.iter().map(PurchaseResponse::from).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

fn status_for(err: &PurchaseError) -> StatusCode {
    match err {
        PurchaseError::CourseNotFound(_) | PurchaseError::PurchaseNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        PurchaseError::SessionUrlMissing
        | PurchaseError::InvalidWebhookSignature(_)
        | PurchaseError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        PurchaseError::PaymentProvider(_) | PurchaseError::Infrastructure(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn log_if_internal(status: StatusCode, err: &PurchaseError) {
    if status.is_server_error() {
        tracing::error!(error = %err, code = %err.code(), "Purchase request failed");
    }
}

/// API error type for client-facing purchase endpoints.
///
/// Body: `{"success":false,"message":...}`; internal details are logged only.
#[derive(Debug)]
pub struct PurchaseApiError(PurchaseError);

impl From<PurchaseError> for PurchaseApiError {
    fn from(err: PurchaseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PurchaseApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_if_internal(status, &self.0);
        (status, Json(ErrorResponse::new(self.0.message()))).into_response()
    }
}

/// API error type for the webhook endpoint.
///
/// Signature failures answer with a plain-text `Webhook error: {reason}`;
/// everything else with `{"message":...}`.
#[derive(Debug)]
pub struct WebhookApiError(PurchaseError);

impl From<PurchaseError> for WebhookApiError {
    fn from(err: PurchaseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_if_internal(status, &self.0);
        match &self.0 {
            PurchaseError::InvalidWebhookSignature(_) => (status, self.0.message()).into_response(),
            other => (
                status,
                Json(WebhookErrorResponse {
                    message: other.message(),
                }),
            )
                .into_response(),
        }
    }
}
