//! HTTP handlers for account endpoints.

use std::sync::Arc;

use axum::extract::{Json, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::dto::{ErrorResponse, MessageResponse};
use crate::adapters::http::extract::ApiJson;
use crate::adapters::http::middleware::{RequireAuth, SESSION_COOKIE};
use crate::application::handlers::account::{
    GetProfileHandler, GetProfileQuery, LoginCommand, LoginHandler, RegisterCommand,
    RegisterHandler, UpdateProfileCommand, UpdateProfileHandler,
};
use crate::domain::account::AccountError;
use crate::ports::{
    AccountRepository, CourseRepository, CredentialHasher, MediaStorage, MediaUpload,
    SessionIssuer,
};

use super::dto::{
    LoginRequest, LoginResponse, ProfileResponse, ProfileUserResponse, RegisterRequest,
    UpdateProfileResponse, UserResponse,
};

/// Multipart field carrying the new display name.
const NAME_FIELD: &str = "name";
/// Multipart field carrying the new profile photo.
const PHOTO_FIELD: &str = "profilePhoto";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for account endpoints.
#[derive(Clone)]
pub struct AccountAppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub sessions: Arc<dyn SessionIssuer>,
    pub media: Arc<dyn MediaStorage>,
    /// Adds `Secure` to session cookies.
    pub cookie_secure: bool,
}

impl AccountAppState {
    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(self.accounts.clone(), self.hasher.clone())
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(
            self.accounts.clone(),
            self.hasher.clone(),
            self.sessions.clone(),
        )
    }

    pub fn profile_handler(&self) -> GetProfileHandler {
        GetProfileHandler::new(self.accounts.clone(), self.courses.clone())
    }

    pub fn update_profile_handler(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.accounts.clone(), self.media.clone())
    }

    fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            SESSION_COOKIE, token, max_age_secs
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/user/register
pub async fn register(
    State(state): State<AccountAppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AccountApiError> {
    let cmd = RegisterCommand {
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
    };

    state.register_handler().handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("Account created successfully.")),
    ))
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<AccountAppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AccountApiError> {
    let cmd = LoginCommand {
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
    };

    let result = state.login_handler().handle(cmd).await?;

    let cookie = state.session_cookie(&result.session.token, result.session.max_age_secs);
    let response = LoginResponse {
        success: true,
        message: format!("Welcome back {}", result.account.name),
        user: UserResponse::from(&result.account),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// GET /api/v1/user/logout
pub async fn logout(State(state): State<AccountAppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.session_cookie("", 0))],
        Json(MessageResponse::ok("Logged out successfully.")),
    )
}

/// PUT /api/v1/user/profile/update (multipart: `name`, `profilePhoto`)
pub async fn update_profile(
    State(state): State<AccountAppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AccountApiError> {
    let mut name = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AccountError::validation("body", format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(NAME_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    AccountError::validation(NAME_FIELD, format!("Failed to read name: {}", e))
                })?;
                name = Some(text);
            }
            Some(PHOTO_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AccountError::validation(PHOTO_FIELD, format!("Failed to read file bytes: {}", e))
                })?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    photo = Some(MediaUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let cmd = UpdateProfileCommand {
        account_id: user.id,
        name,
        photo,
    };

    // The photo cleanup task logs its own failure; the response does not wait for it
    let result = state.update_profile_handler().handle(cmd).await?;

    Ok(Json(UpdateProfileResponse {
        success: true,
        user: UserResponse::from(&result.account),
        message: "Profile updated successfully.".to_string(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/v1/user/profile
pub async fn get_profile(
    State(state): State<AccountAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AccountApiError> {
    let result = state
        .profile_handler()
        .handle(GetProfileQuery {
            account_id: user.id,
        })
        .await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: ProfileUserResponse::new(&result.account, &result.enrolled_courses),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts account errors to HTTP responses.
#[derive(Debug)]
pub struct AccountApiError(AccountError);

impl From<AccountError> for AccountApiError {
    fn from(err: AccountError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AccountApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AccountError::MissingFields
            | AccountError::EmailTaken
            | AccountError::InvalidCredentials
            | AccountError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            AccountError::ProfileNotFound(_) | AccountError::NotFound(_) => StatusCode::NOT_FOUND,
            AccountError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Account request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.0.message()))).into_response()
    }
}
