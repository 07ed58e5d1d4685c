//! Account module - registered users, credentials and enrollments.

mod aggregate;
mod email;
mod errors;
mod photo;

pub use aggregate::Account;
pub use email::EmailAddress;
pub use errors::AccountError;
pub use photo::public_id_from_url;
