//! Purchase module - the purchase ledger and its state machine.

mod aggregate;
mod errors;
mod status;

pub use aggregate::{Completion, Purchase};
pub use errors::PurchaseError;
pub use status::PurchaseStatus;
