//! GetCourseDetailHandler - Query handler for a course with the caller's purchase status.

use std::sync::Arc;

use crate::domain::account::Account;
use crate::domain::catalog::{Course, Lecture};
use crate::domain::foundation::{AccountId, CourseId};
use crate::domain::purchase::{PurchaseError, PurchaseStatus};
use crate::ports::{AccountRepository, CourseRepository, PurchaseRepository};

/// Query for a course as seen by one account.
#[derive(Debug, Clone)]
pub struct GetCourseDetailQuery {
    pub account_id: AccountId,
    /// Course id as supplied by the client.
    pub course_id: String,
}

/// Course detail with creator and lectures expanded.
#[derive(Debug, Clone)]
pub struct GetCourseDetailResult {
    pub course: Course,
    /// Creator account, absent if it no longer exists.
    pub creator: Option<Account>,
    /// Lectures in course order.
    pub lectures: Vec<Lecture>,
    /// True when the account has a completed purchase of the course.
    pub purchased: bool,
    /// Status of the account's most recent purchase of the course.
    pub purchase_status: Option<PurchaseStatus>,
    /// True when the account is in the course's student set.
    pub enrolled: bool,
}

impl GetCourseDetailResult {
    /// Whether the account may watch a given lecture.
    pub fn can_access(&self, lecture: &Lecture) -> bool {
        lecture.is_preview_free || self.enrolled || self.purchased
    }
}

/// Handler for the course detail query.
pub struct GetCourseDetailHandler {
    courses: Arc<dyn CourseRepository>,
    accounts: Arc<dyn AccountRepository>,
    purchases: Arc<dyn PurchaseRepository>,
}

impl GetCourseDetailHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        accounts: Arc<dyn AccountRepository>,
        purchases: Arc<dyn PurchaseRepository>,
    ) -> Self {
        Self {
            courses,
            accounts,
            purchases,
        }
    }

    pub async fn handle(
        &self,
        query: GetCourseDetailQuery,
    ) -> Result<GetCourseDetailResult, PurchaseError> {
        let course_id: CourseId = query
            .course_id
            .trim()
            .parse()
            .map_err(|_| PurchaseError::course_not_found(&query.course_id))?;

        let course = self
            .courses
            .find_by_id(&course_id)
            .await?
            .ok_or_else(|| PurchaseError::course_not_found(&query.course_id))?;

        let creator = self.accounts.find_by_id(&course.creator_id).await?;
        let lectures = self.courses.find_lectures(&course.id).await?;

        // Newest first
        let purchases = self
            .purchases
            .find_by_account_and_course(&query.account_id, &course.id)
            .await?;
        let purchased = purchases.iter().any(|p| p.is_completed());
        let purchase_status = purchases.first().map(|p| p.status);
        let enrolled = course.enrolled_students.contains(&query.account_id);

        Ok(GetCourseDetailResult {
            course,
            creator,
            lectures,
            purchased,
            purchase_status,
            enrolled,
        })
    }
}
