//! `PaymentProvider` backed by the Stripe Checkout REST API.
//!
//! Sessions are created with a form-encoded `POST /v1/checkout/sessions`
//! authenticated by the secret key. Webhooks go through
//! [`SignatureHeader::verify`] before their body is even parsed.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    WebhookEvent, WebhookEventData, WebhookEventType,
};

use super::webhook_types::{
    SignatureError, SignatureHeader, StripeCheckoutSession, StripeErrorResponse,
    StripeWebhookEvent,
};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct StripeConfig {
    /// `sk_live_...` or `sk_test_...`
    api_key: SecretString,
    /// `whsec_...`
    webhook_secret: SecretString,
    api_base_url: String,
    /// Reject events whose `livemode` is false.
    require_livemode: bool,
    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Points the client at another host, e.g. a local fake in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_require_livemode(mut self, livemode_only: bool) -> Self {
        self.require_livemode = livemode_only;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

pub struct StripePaymentAdapter {
    config: StripeConfig,
    http: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn check_signature(&self, payload: &[u8], signature: &str) -> Result<(), SignatureError> {
        let header = SignatureHeader::parse(signature)?;
        header.verify(
            self.config.webhook_secret.expose_secret().as_bytes(),
            payload,
            chrono::Utc::now().timestamp(),
        )
    }

    /// Decodes an already authenticated payload.
    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let envelope: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Undecodable webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !envelope.livemode {
            tracing::warn!(event_id = %envelope.id, "Test mode webhook refused");
            return Err(PaymentError::invalid_webhook(
                "Test mode events are not accepted by this deployment",
            ));
        }

        let event_type = WebhookEventType::from_provider(&envelope.event_type);
        let data = match &event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                let mut session: StripeCheckoutSession =
                    serde_json::from_value(envelope.data.object).map_err(|e| {
                        PaymentError::invalid_webhook(format!("Invalid checkout session: {}", e))
                    })?;
                WebhookEventData::Checkout {
                    course_id: session.metadata.remove("courseId"),
                    account_id: session.metadata.remove("userId"),
                    session_id: session.id,
                    amount_total: session.amount_total,
                }
            }
            WebhookEventType::Unknown(_) => WebhookEventData::Raw {
                json: envelope.data.object.to_string(),
            },
        };

        Ok(WebhookEvent {
            id: envelope.id,
            event_type,
            data,
            created_at: envelope.created,
        })
    }

    /// Form fields for a single-item card payment.
    fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
        let item = &request.line_item;
        let fixed = [
            ("payment_method_types[0]", "card".to_string()),
            ("mode", "payment".to_string()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            ("line_items[0][price_data][product_data][name]", item.name.clone()),
            ("line_items[0][price_data][unit_amount]", item.unit_amount.to_string()),
            ("line_items[0][quantity]", item.quantity.to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[courseId]", request.course_id.to_string()),
            ("metadata[userId]", request.account_id.to_string()),
        ];
        let mut params: Vec<(String, String)> = fixed
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        if let Some(image) = &item.image_url {
            params.push((
                "line_items[0][price_data][product_data][images][0]".to_string(),
                image.clone(),
            ));
        }
        params.extend(request.allowed_countries.iter().enumerate().map(|(i, country)| {
            (
                format!("shipping_address_collection[allowed_countries][{}]", i),
                country.clone(),
            )
        }));

        params
    }

    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let code = match status {
            reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
            reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
            _ => PaymentErrorCode::ProviderError,
        };

        let Ok(StripeErrorResponse { error }) = serde_json::from_str::<StripeErrorResponse>(&body) else {
            return PaymentError::new(code, format!("Stripe API error ({}): {}", status, body));
        };
        let message = error
            .message
            .unwrap_or_else(|| format!("Stripe API error ({})", status));
        let payment_error = PaymentError::new(code, message);
        match error.code.or(error.error_type) {
            Some(provider_code) => payment_error.with_provider_code(provider_code),
            None => payment_error,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.config.api_base_url))
            .basic_auth(self.config.api_key.expose_secret(), None::<&str>)
            .form(&Self::checkout_params(&request))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let error = Self::error_from_response(response).await;
            tracing::error!(course_id = %request.course_id, error = %error, "Checkout session rejected by Stripe");
            return Err(error);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Unreadable checkout session response: {}", e))
        })?;

        tracing::debug!(
            session_id = %session.id,
            course_id = %request.course_id,
            has_url = session.url.is_some(),
            "Checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
            expires_at: session.expires_at,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        if let Err(e) = self.check_signature(payload, signature) {
            tracing::warn!(error = %e, "Webhook signature rejected");
            return Err(PaymentError::invalid_webhook(e.to_string()));
        }

        let event = self.parse_event(payload)?;
        tracing::info!(
            event_id = %event.id,
            event_type = event.event_type.as_str(),
            "Webhook verified"
        );
        Ok(event)
    }
}
