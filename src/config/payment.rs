//! Stripe Checkout settings

use serde::Deserialize;

use super::error::ValidationError;

/// `COURSE_MARKET__PAYMENT__*`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Secret key, `sk_test_...` or `sk_live_...`
    pub stripe_api_key: String,

    /// Endpoint signing secret, `whsec_...`
    pub stripe_webhook_secret: String,

    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Front-end origin; checkout success and cancel pages live under it
    pub client_url: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Comma-separated shipping countries offered at checkout
    #[serde(default = "default_allowed_countries")]
    pub allowed_countries: String,
}

/// Which Stripe environment the secret key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeMode {
    Test,
    Live,
    /// Restricted or otherwise unrecognised key.
    Other,
}

impl PaymentConfig {
    pub fn mode(&self) -> StripeMode {
        match self.stripe_api_key.get(..8) {
            Some("sk_test_") => StripeMode::Test,
            Some("sk_live_") => StripeMode::Live,
            _ => StripeMode::Other,
        }
    }

    pub fn is_test_mode(&self) -> bool {
        self.mode() == StripeMode::Test
    }

    /// Live keys only accept live webhook events.
    pub fn is_live_mode(&self) -> bool {
        self.mode() == StripeMode::Live
    }

    /// Uppercased ISO codes, blanks dropped.
    pub fn allowed_countries_list(&self) -> Vec<String> {
        self.allowed_countries
            .split(',')
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            (&self.stripe_api_key, "STRIPE_API_KEY"),
            (&self.stripe_webhook_secret, "STRIPE_WEBHOOK_SECRET"),
            (&self.client_url, "CLIENT_URL"),
        ];
        if let Some((_, name)) = required.iter().find(|(value, _)| value.is_empty()) {
            return Err(ValidationError::MissingRequired(*name));
        }

        // A publishable key (pk_) cannot create sessions.
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if !["http://", "https://"]
            .iter()
            .any(|scheme| self.client_url.starts_with(scheme))
        {
            return Err(ValidationError::InvalidClientUrl);
        }
        let currency_ok =
            self.currency.len() == 3 && self.currency.bytes().all(|b| b.is_ascii_alphabetic());
        if !currency_ok {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "pkr".to_string()
}

fn default_allowed_countries() -> String {
    "PK".to_string()
}
