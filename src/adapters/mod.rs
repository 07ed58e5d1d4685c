//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session tokens and password hashing
//! - `http` - Axum REST API
//! - `media` - Profile photo storage
//! - `memory` - In-memory repositories for tests and local runs
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe hosted checkout and webhooks

pub mod auth;
pub mod http;
pub mod media;
pub mod memory;
pub mod postgres;
pub mod stripe;
