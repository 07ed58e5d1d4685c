//! Scriptable `PaymentProvider` for handler and HTTP tests.
//!
//! Records every checkout request and can be told to fail once, to return
//! a session without a URL, or to accept only one exact signature header.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

/// Clones share state, so a test can keep one handle for assertions.
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Served once, then the default session again.
    next_checkout: Option<CheckoutSession>,

    next_webhook_event: Option<WebhookEvent>,

    /// Consumed by the next call of either method.
    next_error: Option<PaymentError>,

    checkout_requests: Vec<CreateCheckoutRequest>,

    call_log: Vec<String>,

    webhook_verify_mode: WebhookVerifyMode,
}

#[derive(Default, Clone)]
enum WebhookVerifyMode {
    #[default]
    AcceptAll,

    RequireSignature(String),
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that only accepts the given `Stripe-Signature` value.
    pub fn requiring_signature(signature: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::RequireSignature(signature.into());
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }


    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.state().next_checkout = Some(session);
    }

    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.state().next_webhook_event = Some(event);
    }

    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }


    /// Calls made to `method`, by trait method name.
    pub fn call_count(&self, method: &str) -> usize {
        self.state().call_log.iter().filter(|m| *m == method).count()
    }

    /// Requests received by `create_checkout_session`, oldest first.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    fn record_call(&self, method: &str) {
        self.state().call_log.push(method.to_string());
    }

    fn check_error(&self) -> Result<(), PaymentError> {
        match self.state().next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// A completed-checkout event without course or buyer metadata.
    pub fn checkout_completed_event(session_id: &str, amount_total: Option<i64>) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_checkout_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::Checkout {
                session_id: session_id.to_string(),
                amount_total,
                course_id: None,
                account_id: None,
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn unrelated_event(event_type: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_other_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::from_provider(event_type),
            data: WebhookEventData::Raw {
                json: "{}".to_string(),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call("create_checkout_session");
        self.check_error()?;

        let mut state = self.state();
        state.checkout_requests.push(request);

        let session = state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutSession {
                url: Some(format!("https://checkout.stripe.com/c/pay/{}", id)),
                id,
                expires_at: Some(chrono::Utc::now().timestamp() + 24 * 60 * 60),
            }
        });

        Ok(session)
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.record_call("verify_webhook");
        self.check_error()?;

        let state = self.state();

        if let WebhookVerifyMode::RequireSignature(required) = &state.webhook_verify_mode {
            if signature != required {
                return Err(PaymentError::invalid_webhook("Invalid signature"));
            }
        }

        if let Some(event) = &state.next_webhook_event {
            return Ok(event.clone());
        }

        let parsed: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        let event_type = WebhookEventType::from_provider(parsed["type"].as_str().unwrap_or(""));
        let object = &parsed["data"]["object"];
        let data = match event_type {
            WebhookEventType::CheckoutSessionCompleted => WebhookEventData::Checkout {
                session_id: object["id"].as_str().unwrap_or_default().to_string(),
                amount_total: object["amount_total"].as_i64(),
                course_id: object["metadata"]["courseId"].as_str().map(String::from),
                account_id: object["metadata"]["userId"].as_str().map(String::from),
            },
            WebhookEventType::Unknown(_) => WebhookEventData::Raw {
                json: object.to_string(),
            },
        };

        Ok(WebhookEvent {
            id: parsed["id"].as_str().unwrap_or("evt_mock").to_string(),
            event_type,
            data,
            created_at: parsed["created"]
                .as_i64()
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
        })
    }
}
