//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `AccountRepository` - Account store
//! - `CourseRepository` - Catalog store
//! - `PurchaseRepository` - Purchase ledger
//! - `MediaStorage` - Uploaded profile photos
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - Hosted checkout and webhook authentication
//!
//! ## Auth Ports
//!
//! - `CredentialHasher` - Password hashing
//! - `SessionIssuer` / `SessionValidator` - Session cookie tokens

mod account_repository;
mod course_repository;
mod credential_hasher;
mod media_storage;
mod payment_provider;
mod purchase_repository;
mod session_validator;

pub use account_repository::AccountRepository;
pub use course_repository::CourseRepository;
pub use credential_hasher::CredentialHasher;
pub use media_storage::{MediaStorage, MediaUpload, StorageError, StoredMedia};
pub use payment_provider::{
    CheckoutLineItem, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use purchase_repository::PurchaseRepository;
pub use session_validator::{IssuedSession, SessionIssuer, SessionValidator};
