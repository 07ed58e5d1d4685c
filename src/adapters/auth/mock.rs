//! Fixed-token `SessionValidator` for HTTP tests that should not sign JWTs.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Accepts exactly the tokens it was built with.
#[derive(Debug, Default, Clone)]
pub struct MockSessionValidator {
    sessions: HashMap<String, AuthenticatedUser>,
    failure: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.sessions.insert(token.into(), user);
        self
    }

    /// Every call fails with `error`, known tokens included.
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
