//! Application router: API modules, auth middleware and the tower-http stack.

use std::path::PathBuf;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::account::{account_router, AccountAppState};
use super::middleware::{auth_middleware, AuthState};
use super::purchase::{purchase_router, PurchaseAppState};

/// Room for multipart framing and the text fields around an upload.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Origins allowed to send credentialed requests.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Directory served under `/media`.
    pub media_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Builds the complete application router.
///
/// # Routes
/// - `/api/v1/purchase/...` - Purchase module
/// - `/api/v1/user/...` - Account module
/// - `GET /health` - Liveness
/// - `GET /media/{file}` - Uploaded media
pub fn app_router(
    purchase: PurchaseAppState,
    account: AccountAppState,
    sessions: AuthState,
    settings: &RouterSettings,
) -> Router {
    let api = Router::new()
        .nest("/api/v1/purchase", purchase_router().with_state(purchase))
        .nest(
            "/api/v1/user",
            account_router()
                .with_state(account)
                .layer(DefaultBodyLimit::max(
                    settings.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
                )),
        )
        .layer(axum::middleware::from_fn_with_state(sessions, auth_middleware));

    Router::new()
        .merge(api)
        .route("/health", get(health))
        .nest_service("/media", ServeDir::new(&settings.media_dir))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&settings.cors_origins))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(settings.request_timeout)),
        )
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// CORS with credentials; origins must be listed explicitly.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
