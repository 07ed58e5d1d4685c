//! Course repository port.
//!
//! Read access to the catalog plus the two writes a completed purchase
//! performs on it: unlocking lecture previews and adding a student.
//! `save` and `save_lecture` exist for seeding; catalog editing is not
//! exposed over HTTP.

use crate::domain::catalog::{Course, Lecture};
use crate::domain::foundation::{AccountId, CourseId, DomainError};
use async_trait::async_trait;

/// Repository port for Course and Lecture persistence.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Save a new course.
    async fn save(&self, course: &Course) -> Result<(), DomainError>;

    /// Save a new lecture and append it to its course outline.
    ///
    /// # Errors
    ///
    /// - `CourseNotFound` if the owning course doesn't exist
    async fn save_lecture(&self, lecture: &Lecture) -> Result<(), DomainError>;

    /// Find a course by ID.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Find several courses at once. Unknown ids are skipped; order follows `ids`.
    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError>;

    /// List a course's lectures in outline order.
    async fn find_lectures(&self, course_id: &CourseId) -> Result<Vec<Lecture>, DomainError>;

    /// Mark every lecture of the course as a free preview.
    ///
    /// Returns the number of lectures that changed.
    async fn unlock_lectures(&self, course_id: &CourseId) -> Result<u64, DomainError>;

    /// Add an account to the course's student set.
    ///
    /// Returns true if the student was new.
    async fn add_enrolled_student(
        &self,
        course_id: &CourseId,
        account_id: &AccountId,
    ) -> Result<bool, DomainError>;
}
