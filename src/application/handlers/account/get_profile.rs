//! GetProfileHandler - Query handler for the caller's profile.

use std::sync::Arc;

use crate::domain::account::{Account, AccountError};
use crate::domain::catalog::Course;
use crate::domain::foundation::AccountId;
use crate::ports::{AccountRepository, CourseRepository};

#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub account_id: AccountId,
}

/// Profile with enrolled courses expanded.
#[derive(Debug, Clone)]
pub struct GetProfileResult {
    pub account: Account,
    pub enrolled_courses: Vec<Course>,
}

pub struct GetProfileHandler {
    accounts: Arc<dyn AccountRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl GetProfileHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { accounts, courses }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<GetProfileResult, AccountError> {
        let account = self
            .accounts
            .find_by_id(&query.account_id)
            .await?
            .ok_or(AccountError::ProfileNotFound(query.account_id))?;

        let mut enrolled_courses = self.courses.find_by_ids(&account.enrolled_courses).await?;
        // Enrollment order, not storage order
        enrolled_courses.sort_by_key(|course| {
            account
                .enrolled_courses
                .iter()
                .position(|id| *id == course.id)
                .unwrap_or(usize::MAX)
        });

        Ok(GetProfileResult {
            account,
            enrolled_courses,
        })
    }
}
