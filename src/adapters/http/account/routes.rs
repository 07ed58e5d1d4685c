//! Axum router configuration for account endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{get_profile, login, logout, register, update_profile, AccountAppState};

/// Create the account API router, mounted at `/api/v1/user`.
///
/// # Routes
///
/// ## Public
/// - `POST /register` - Create an account
/// - `POST /login` - Log in and receive the session cookie
/// - `GET /logout` - Clear the session cookie
///
/// ## Authenticated
/// - `GET /profile` - Current profile with enrolled courses
/// - `PUT /profile/update` - Multipart name/photo update
pub fn account_router() -> Router<AccountAppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/profile", get(get_profile))
        .route("/profile/update", put(update_profile))
}
