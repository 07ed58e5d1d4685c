//! Purchase-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound | 404 |
//! | PurchaseNotFound | 404 |
//! | SessionUrlMissing | 400 |
//! | InvalidWebhookSignature | 400 |
//! | ValidationFailed | 400 |
//! | PaymentProvider | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised by checkout, webhook and purchase queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// The requested course does not exist (raw id as supplied).
    CourseNotFound(String),

    /// No purchase is correlated with this checkout session id.
    PurchaseNotFound(String),

    /// The provider created a session but returned no redirect URL.
    SessionUrlMissing,

    /// Webhook authenticity check failed.
    InvalidWebhookSignature(String),

    /// Input was malformed.
    ValidationFailed { field: String, message: String },

    /// Payment provider call failed.
    PaymentProvider(String),

    /// Storage failure.
    Infrastructure(String),
}

impl PurchaseError {
    pub fn course_not_found(id: impl Into<String>) -> Self {
        PurchaseError::CourseNotFound(id.into())
    }

    pub fn purchase_not_found(session_id: impl Into<String>) -> Self {
        PurchaseError::PurchaseNotFound(session_id.into())
    }

    pub fn invalid_webhook_signature(reason: impl Into<String>) -> Self {
        PurchaseError::InvalidWebhookSignature(reason.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PurchaseError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn payment_provider(message: impl Into<String>) -> Self {
        PurchaseError::PaymentProvider(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PurchaseError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PurchaseError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            PurchaseError::PurchaseNotFound(_) => ErrorCode::PurchaseNotFound,
            PurchaseError::SessionUrlMissing => ErrorCode::PaymentProviderError,
            PurchaseError::InvalidWebhookSignature(_) => ErrorCode::Unauthorized,
            PurchaseError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PurchaseError::PaymentProvider(_) => ErrorCode::PaymentProviderError,
            PurchaseError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns the message shown to API clients.
    pub fn message(&self) -> String {
        match self {
            PurchaseError::CourseNotFound(_) => "Course not found!".to_string(),
            PurchaseError::PurchaseNotFound(_) => "Purchase not found".to_string(),
            PurchaseError::SessionUrlMissing => "Error while creating session".to_string(),
            PurchaseError::InvalidWebhookSignature(reason) => {
                format!("Webhook error: {}", reason)
            }
            PurchaseError::ValidationFailed { message, .. } => message.clone(),
            PurchaseError::PaymentProvider(_) | PurchaseError::Infrastructure(_) => {
                "Internal Server Error".to_string()
            }
        }
    }

    /// Returns true if the provider should retry delivery of the triggering webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurchaseError::Infrastructure(_) | PurchaseError::PaymentProvider(_)
        )
    }
}

impl std::fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseError::CourseNotFound(id) => write!(f, "Course not found: {}", id),
            PurchaseError::PurchaseNotFound(session) => {
                write!(f, "No purchase for checkout session {}", session)
            }
            PurchaseError::PaymentProvider(detail) => write!(f, "Payment provider error: {}", detail),
            PurchaseError::Infrastructure(detail) => write!(f, "Purchase storage error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for PurchaseError {}

impl From<DomainError> for PurchaseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => PurchaseError::ValidationFailed {
                field: err.field.clone().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::PaymentProviderError => PurchaseError::PaymentProvider(err.to_string()),
            _ => PurchaseError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for PurchaseError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<PurchaseError> for DomainError {
    fn from(err: PurchaseError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_match_api_contract() {
        assert_eq!(PurchaseError::course_not_found("x").message(), "Course not found!");
        assert_eq!(PurchaseError::purchase_not_found("cs").message(), "Purchase not found");
        assert_eq!(
            PurchaseError::SessionUrlMissing.message(),
            "Error while creating session"
        );
        assert_eq!(
            PurchaseError::invalid_webhook_signature("Invalid signature").message(),
            "Webhook error: Invalid signature"
        );
    }

    #[test]
    fn internal_errors_hide_detail_from_clients() {
        let err = PurchaseError::infrastructure("deadlock detected");
        assert_eq!(err.message(), "Internal Server Error");
        assert!(err.to_string().contains("deadlock detected"));
    }

    #[test]
    fn database_error_converts_to_infrastructure() {
        let err: PurchaseError = DomainError::database("pool timed out").into();
        assert!(matches!(err, PurchaseError::Infrastructure(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: PurchaseError = ValidationError::empty_field("course_id").into();
        match err {
            PurchaseError::ValidationFailed { field, .. } => assert_eq!(field, "course_id"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn not_found_is_not_retryable() {
        assert!(!PurchaseError::purchase_not_found("cs_1").is_retryable());
    }

    #[test]
    fn converts_back_into_domain_error() {
        let err: DomainError = PurchaseError::course_not_found("abc").into();
        assert_eq!(err.code, ErrorCode::CourseNotFound);
    }
}
