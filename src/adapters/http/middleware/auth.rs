//! Session resolution for axum.
//!
//! `auth_middleware` runs on every API route and leaves either an
//! [`AuthenticatedUser`] or an [`AuthFailure`] in the request extensions.
//! Handlers then opt in with [`RequireAuth`] or [`OptionalAuth`]. A stale
//! cookie therefore never blocks a public route.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::super::dto::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

pub type AuthState = Arc<dyn SessionValidator>;

/// Why a presented credential was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure(pub AuthError);

/// Extracts the session token from the `token` cookie or a Bearer header.
///
/// The cookie wins when both are present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        });

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

/// Validates the session token, if any, and records the outcome in the
/// request extensions. Never rejects by itself.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        match validator.validate(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => {
                if let AuthError::ServiceUnavailable(detail) = &e {
                    tracing::error!(error = %detail, "Session validation unavailable");
                } else {
                    tracing::debug!(error = %e, "Rejected session credential");
                }
                request.extensions_mut().insert(AuthFailure(e));
            }
        }
    }

    next.run(request).await
}

/// The caller's account; rejects with 401 when there is none.
///
/// A presented-but-rejected credential yields a more specific message than
/// `User not authenticated`.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(RequireAuth(user.clone()));
        }

        Err(match parts.extensions.get::<AuthFailure>() {
            Some(AuthFailure(AuthError::TokenExpired)) => AuthRejection::Expired,
            Some(AuthFailure(AuthError::ServiceUnavailable(_))) => AuthRejection::Unavailable,
            Some(AuthFailure(AuthError::InvalidToken)) => AuthRejection::Invalid,
            None => AuthRejection::Unauthenticated,
        })
    }
}

/// The caller's account, if a valid session was presented.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// 401, or 503 when sessions cannot be checked at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No credential was provided.
    Unauthenticated,
    /// The credential was malformed or badly signed.
    Invalid,
    /// The credential was valid but has expired.
    Expired,
    /// The validator could not be reached.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "User not authenticated"),
            AuthRejection::Invalid => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthRejection::Expired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthRejection::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable",
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::AccountId;
    use axum::body::Body;
    use axum::extract::FromRequestParts;
    use axum::http::{HeaderValue, Request as HttpRequest};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(AccountId::new(), "test@example.com")
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Extraction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn token_from_cookie() {
        let map = headers(&[("cookie", "theme=dark; token=abc.def.ghi; lang=en")]);
        assert_eq!(session_token(&map), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn token_from_bearer_header() {
        let map = headers(&[("authorization", "Bearer my-token")]);
        assert_eq!(session_token(&map), Some("my-token".to_string()));

        let basic = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(session_token(&basic), None);
    }

    #[test]
    fn cookie_wins_over_header() {
        let map = headers(&[
            ("cookie", "token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(session_token(&map), Some("from-cookie".to_string()));
    }

    #[test]
    fn cleared_cookie_is_no_token() {
        let map = headers(&[("cookie", "token=")]);
        assert_eq!(session_token(&map), None);

        let similar = headers(&[("cookie", "xtoken=abc")]);
        assert_eq!(session_token(&similar), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_extracts_user_from_extensions() {
        let mut request: HttpRequest<()> = HttpRequest::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(test_user());
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.email, "test@example.com");
    }

    #[tokio::test]
    async fn require_auth_reports_why() {
        let request: HttpRequest<()> = HttpRequest::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();
        assert_eq!(
            RequireAuth::from_request_parts(&mut parts, &()).await.unwrap_err(),
            AuthRejection::Unauthenticated
        );

        parts.extensions.insert(AuthFailure(AuthError::TokenExpired));
        assert_eq!(
            RequireAuth::from_request_parts(&mut parts, &()).await.unwrap_err(),
            AuthRejection::Expired
        );
    }

    #[tokio::test]
    async fn optional_auth_returns_none_when_absent() {
        let request: HttpRequest<()> = HttpRequest::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn unauthenticated_rejection_is_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn app(validator: MockSessionValidator) -> Router {
        let state: AuthState = Arc::new(validator);
        Router::new()
            .route(
                "/protected",
                get(|RequireAuth(user): RequireAuth| async move { user.email }),
            )
            .route("/public", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    #[tokio::test]
    async fn valid_cookie_reaches_protected_handler() {
        let app = app(MockSessionValidator::new().with_user("good", test_user()));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", "token=good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stale_cookie_does_not_block_public_routes() {
        let app = app(MockSessionValidator::new());

        let public = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .uri("/public")
                    .header("cookie", "token=stale")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(public.status(), StatusCode::OK);

        let protected = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", "token=stale")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(protected.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unavailable_validator_is_503_on_protected_routes() {
        let app = app(
            MockSessionValidator::new()
                .with_error(AuthError::service_unavailable("key store offline")),
        );

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", "token=any")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAuth>();
    }
}
