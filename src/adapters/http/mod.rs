//! HTTP adapters - REST API implementations.
//!
//! Each module has its own HTTP adapter for endpoint exposure; `router`
//! assembles them behind the session middleware and the tower-http stack.

pub mod account;
pub mod dto;
pub mod extract;
pub mod middleware;
pub mod purchase;
pub mod router;

pub use account::{account_router, AccountAppState};
pub use purchase::{purchase_router, PurchaseAppState};
pub use router::{app_router, RouterSettings};
