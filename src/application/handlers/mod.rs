//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped by
//! the aggregate they serve.

pub mod account;
pub mod purchase;
