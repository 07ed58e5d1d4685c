//! Course Market API server.
//!
//! Loads configuration, connects to PostgreSQL, wires adapters into the
//! application handlers and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_market::adapters::auth::{Argon2CredentialHasher, JwtSessionService};
use course_market::adapters::http::{app_router, AccountAppState, PurchaseAppState, RouterSettings};
use course_market::adapters::media::FsMediaStorage;
use course_market::adapters::postgres::{
    PostgresAccountRepository, PostgresCourseRepository, PostgresPurchaseRepository,
};
use course_market::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use course_market::application::CheckoutSettings;
use course_market::config::{AppConfig, ConfigError, ValidationError};
use course_market::ports::PaymentError;

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Payment provider setup failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("Server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe_mode = ?config.payment.mode(),
        "Configuration loaded"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let accounts = Arc::new(PostgresAccountRepository::new(pool.clone()));
    let courses = Arc::new(PostgresCourseRepository::new(pool.clone()));
    let purchases = Arc::new(PostgresPurchaseRepository::new(pool));

    let stripe = StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
    )
    .with_base_url(config.payment.stripe_api_base_url.clone())
    .with_require_livemode(config.payment.is_live_mode());
    let payment_provider = Arc::new(StripePaymentAdapter::new(stripe)?);

    let sessions = Arc::new(JwtSessionService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    ));
    let media = Arc::new(FsMediaStorage::new(
        &config.media.storage_dir,
        config.media.public_base_url.clone(),
        config.media.max_upload_bytes,
    ));

    let purchase_state = PurchaseAppState {
        accounts: accounts.clone(),
        courses: courses.clone(),
        purchases,
        payment_provider,
        checkout: CheckoutSettings {
            client_url: config.payment.client_url.clone(),
            currency: config.payment.currency.to_ascii_lowercase(),
            allowed_countries: config.payment.allowed_countries_list(),
        },
    };
    let account_state = AccountAppState {
        accounts,
        courses,
        hasher: Arc::new(Argon2CredentialHasher::new()),
        sessions: sessions.clone(),
        media,
        cookie_secure: config.auth.cookie_secure,
    };
    let settings = RouterSettings {
        cors_origins: config.server.cors_origins_list(),
        request_timeout: config.server.request_timeout(),
        media_dir: config.media.storage_dir.clone(),
        max_upload_bytes: config.media.max_upload_bytes,
    };

    let app = app_router(purchase_state, account_state, sessions, &settings);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable output elsewhere.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
