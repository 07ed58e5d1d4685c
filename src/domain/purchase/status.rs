//! Purchase status state machine.
//!
//! A purchase is created `pending` when checkout starts and becomes
//! `completed` once the payment provider confirms the session. There is no
//! failed or refunded state.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Checkout session created, payment not yet confirmed.
    Pending,

    /// Payment confirmed by webhook. Terminal.
    Completed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
        }
    }
}

impl FromStr for PurchaseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PurchaseStatus::Pending),
            "completed" => Ok(PurchaseStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "purchase_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for PurchaseStatus {
    fn next_states(&self) -> &'static [Self] {
        match self {
            PurchaseStatus::Pending => &[PurchaseStatus::Completed],
            PurchaseStatus::Completed => &[],
        }
    }
}
