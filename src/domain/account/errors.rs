//! Account lifecycle errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | MissingFields | 400 |
//! | EmailTaken | 400 |
//! | InvalidCredentials | 400 |
//! | ValidationFailed | 400 |
//! | ProfileNotFound | 404 |
//! | NotFound | 404 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{AccountId, DomainError, ErrorCode, ValidationError};

/// Errors raised by registration, login and profile operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// One of the required fields was missing or blank.
    MissingFields,

    /// Another account already uses this email.
    EmailTaken,

    /// Unknown email or wrong password. Deliberately indistinguishable.
    InvalidCredentials,

    /// Input was present but malformed.
    ValidationFailed { field: String, message: String },

    /// Profile lookup for the session's account found nothing.
    ProfileNotFound(AccountId),

    /// Profile update target does not exist.
    NotFound(AccountId),

    /// Storage, hashing or media failure.
    Infrastructure(String),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AccountError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AccountError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AccountError::MissingFields => ErrorCode::EmptyField,
            AccountError::EmailTaken => ErrorCode::EmailTaken,
            AccountError::InvalidCredentials => ErrorCode::Unauthorized,
            AccountError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AccountError::ProfileNotFound(_) | AccountError::NotFound(_) => {
                ErrorCode::AccountNotFound
            }
            AccountError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns the message shown to API clients.
    pub fn message(&self) -> String {
        match self {
            AccountError::MissingFields => "All fields are required.".to_string(),
            AccountError::EmailTaken => "User already exist with this email.".to_string(),
            AccountError::InvalidCredentials => "Incorrect email or password".to_string(),
            AccountError::ValidationFailed { message, .. } => message.clone(),
            AccountError::ProfileNotFound(_) => "Profile not found".to_string(),
            AccountError::NotFound(_) => "User not found".to_string(),
            AccountError::Infrastructure(_) => "Internal Server Error".to_string(),
        }
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::Infrastructure(detail) => write!(f, "Account infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmailTaken => AccountError::EmailTaken,
            ErrorCode::ValidationFailed | ErrorCode::InvalidFormat | ErrorCode::OutOfRange => {
                let field = err.field.clone().unwrap_or_default();
                AccountError::ValidationFailed {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::EmptyField => AccountError::MissingFields,
            _ => AccountError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { .. } => AccountError::MissingFields,
            ValidationError::InvalidFormat { field, reason } => AccountError::ValidationFailed {
                message: format!("Invalid {}: {}", field, reason),
                field,
            },
            ValidationError::OutOfRange { ref field, .. } => AccountError::ValidationFailed {
                field: field.clone(),
                message: err.to_string(),
            },
        }
    }
}
