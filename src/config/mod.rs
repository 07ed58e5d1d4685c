//! Typed configuration read from `COURSE_MARKET__<SECTION>__<KEY>` variables.
//!
//! A `.env` file in the working directory is honored during development.

mod auth;
mod database;
mod error;
mod media;
mod payment;
mod server;

pub use auth::{AuthConfig, MIN_JWT_SECRET_BYTES};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use media::MediaConfig;
pub use payment::{PaymentConfig, StripeMode};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and the process environment.
    ///
    /// `COURSE_MARKET__SERVER__PORT=8080` maps to `server.port`.
    pub fn load() -> Result<Self, ConfigError> {
        // Runs before tracing is initialised; a missing .env is normal.
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSE_MARKET")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// First invalid section wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.media.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
