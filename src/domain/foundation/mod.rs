//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, error types and the state machine trait that the
//! account, catalog and purchase modules build on.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AccountId, CourseId, LectureId, PurchaseId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
