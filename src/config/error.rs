//! Configuration errors

use thiserror::Error;

/// Startup failure while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing variable or a value of the wrong type
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that is present but unusable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    // server
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    // database
    #[error("Database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,
    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,
    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    // payment
    #[error("Stripe API key must be a secret key (sk_...)")]
    InvalidStripeKey,
    #[error("Stripe webhook secret must start with whsec_")]
    InvalidStripeWebhookSecret,
    #[error("Client URL must be an http(s) URL")]
    InvalidClientUrl,
    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    // auth
    #[error("JWT secret must be at least {0} bytes")]
    JwtSecretTooShort(usize),
    #[error("Session token TTL must be positive")]
    InvalidTokenTtl,
    #[error("Session cookies must be Secure in production")]
    InsecureCookieInProduction,

    // media
    #[error("Maximum upload size must be positive")]
    InvalidUploadLimit,
}
