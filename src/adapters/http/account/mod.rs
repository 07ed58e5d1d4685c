//! HTTP adapter for account endpoints.
//!
//! - `POST /api/v1/user/register` - Register
//! - `POST /api/v1/user/login` - Login (sets the `token` cookie)
//! - `GET /api/v1/user/logout` - Logout (clears the cookie)
//! - `GET /api/v1/user/profile` - Profile
//! - `PUT /api/v1/user/profile/update` - Profile update

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AccountApiError, AccountAppState};
pub use routes::account_router;
