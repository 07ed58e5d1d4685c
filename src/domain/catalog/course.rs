//! Course aggregate.
//!
//! # Design Decisions
//!
//! - **Price in major units**: the catalog stores whole currency units; the
//!   payment provider is sent minor units (`price * 100`)
//! - **Lecture order**: `lecture_ids` keeps the order lectures were added
//! - **Student set**: `enrolled_students` never holds an account twice

use crate::domain::foundation::{AccountId, CourseId, LectureId, Timestamp, ValidationError};

use super::Lecture;

/// Minor currency units per major unit (paisa per rupee, cents per dollar).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A purchasable course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub subtitle: Option<String>,
    /// Price in major currency units. Always positive.
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub creator_id: AccountId,
    pub lecture_ids: Vec<LectureId>,
    pub enrolled_students: Vec<AccountId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    /// Creates a course with no lectures or students.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the title is blank
    /// - `OutOfRange` if the price is not positive
    pub fn new(title: &str, price: i64, creator_id: AccountId) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("course_title"));
        }
        if price < 1 {
            return Err(ValidationError::out_of_range("course_price", 1, i64::MAX, price));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: CourseId::new(),
            title: title.to_string(),
            subtitle: None,
            price,
            thumbnail_url: None,
            creator_id,
            lecture_ids: Vec::new(),
            enrolled_students: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Appends a lecture to the course outline.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the lecture belongs to another course.
    pub fn add_lecture(&mut self, lecture: &Lecture) -> Result<(), ValidationError> {
        if lecture.course_id != self.id {
            return Err(ValidationError::invalid_format(
                "lecture",
                format!("lecture {} belongs to course {}", lecture.id, lecture.course_id),
            ));
        }
        if !self.lecture_ids.contains(&lecture.id) {
            self.lecture_ids.push(lecture.id);
            self.updated_at = Timestamp::now();
        }
        Ok(())
    }

    pub fn has_lectures(&self) -> bool {
        !self.lecture_ids.is_empty()
    }

    /// Price in minor units as charged by the payment provider.
    ///
    /// Returns `None` on overflow.
    pub fn unit_amount(&self) -> Option<i64> {
        self.price.checked_mul(MINOR_UNITS_PER_MAJOR)
    }

    /// Adds a student to the course.
    ///
    /// Returns false if the student was already enrolled.
    pub fn enroll_student(&mut self, account_id: AccountId) -> bool {
        if self.enrolled_students.contains(&account_id) {
            return false;
        }
        self.enrolled_students.push(account_id);
        self.updated_at = Timestamp::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(price: i64) -> Course {
        Course::new("Rust for Backend Engineers", price, AccountId::new()).unwrap()
    }

    #[test]
    fn new_rejects_non_positive_price() {
        let result = Course::new("Free?", 0, AccountId::new());
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn new_rejects_blank_title() {
        let result = Course::new("  ", 500, AccountId::new());
        assert_eq!(result, Err(ValidationError::empty_field("course_title")));
    }

    #[test]
    fn unit_amount_is_price_times_hundred() {
        assert_eq!(course(500).unit_amount(), Some(50_000));
    }

    #[test]
    fn unit_amount_reports_overflow() {
        assert_eq!(course(i64::MAX).unit_amount(), None);
    }

    #[test]
    fn add_lecture_keeps_order_and_ignores_duplicates() {
        let mut c = course(500);
        let first = Lecture::new(c.id, "Intro").unwrap();
        let second = Lecture::new(c.id, "Traits").unwrap();

        c.add_lecture(&first).unwrap();
        c.add_lecture(&second).unwrap();
        c.add_lecture(&first).unwrap();

        assert_eq!(c.lecture_ids, vec![first.id, second.id]);
        assert!(c.has_lectures());
    }

    #[test]
    fn add_lecture_rejects_foreign_lecture() {
        let mut c = course(500);
        let foreign = Lecture::new(CourseId::new(), "Elsewhere").unwrap();
        assert!(c.add_lecture(&foreign).is_err());
        assert!(!c.has_lectures());
    }

    #[test]
    fn enroll_student_is_idempotent() {
        let mut c = course(500);
        let student = AccountId::new();
        assert!(c.enroll_student(student));
        assert!(!c.enroll_student(student));
        assert_eq!(c.enrolled_students, vec![student]);
    }
}
