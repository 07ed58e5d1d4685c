//! Course Market - Course marketplace backend
//!
//! Accounts with cookie sessions and profile photos, a course catalog with
//! free-preview lectures, and one-time course purchases through Stripe hosted
//! checkout, settled by signed webhooks.
//!
//! Layers follow ports and adapters: `domain` holds the business rules,
//! `application` the command and query handlers, `ports` the seams, and
//! `adapters` the HTTP, Postgres, Stripe and storage implementations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
