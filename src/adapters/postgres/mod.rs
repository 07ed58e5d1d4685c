//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountRepository` - Accounts and their enrolled courses
//! - `PostgresCourseRepository` - Courses, lectures and student sets
//! - `PostgresPurchaseRepository` - Purchase ledger
//!
//! Schema lives in `migrations/` and is applied with `sqlx::migrate!`.

mod account_repository;
mod course_repository;
mod purchase_repository;

pub use account_repository::PostgresAccountRepository;
pub use course_repository::PostgresCourseRepository;
pub use purchase_repository::PostgresPurchaseRepository;
