//! In-memory repository adapters.
//!
//! Implement the storage ports over `tokio::sync::RwLock` maps. Used by
//! tests and by local development runs without a database.

mod account_repository;
mod course_repository;
mod purchase_repository;

pub use account_repository::InMemoryAccountRepository;
pub use course_repository::InMemoryCourseRepository;
pub use purchase_repository::InMemoryPurchaseRepository;
