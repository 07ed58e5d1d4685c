//! HTTP middleware for axum.
//!
//! - `auth` - Session cookie authentication and extractors

pub mod auth;

pub use auth::{
    auth_middleware, session_token, AuthFailure, AuthRejection, AuthState, OptionalAuth,
    RequireAuth, SESSION_COOKIE,
};
