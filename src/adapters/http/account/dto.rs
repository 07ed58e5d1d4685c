//! Request and response DTOs for account endpoints.
//!
//! No response type carries the credential hash.

use serde::{Deserialize, Serialize};

use crate::adapters::http::purchase::dto::CourseResponse;
use crate::domain::account::Account;
use crate::domain::catalog::Course;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Registration body. Missing fields are reported as "All fields are required."
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Account as returned after login and profile update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    /// Enrolled course ids.
    pub enrolled_courses: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.as_str().to_string(),
            photo_url: account.photo_url.clone(),
            enrolled_courses: account.enrolled_courses.iter().map(ToString::to_string).collect(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Account with enrolled courses expanded, for the profile page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub enrolled_courses: Vec<CourseResponse>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProfileUserResponse {
    pub fn new(account: &Account, courses: &[Course]) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.as_str().to_string(),
            photo_url: account.photo_url.clone(),
            enrolled_courses: courses.iter().map(CourseResponse::from).collect(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: ProfileUserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub user: UserResponse,
    pub message: String,
}
