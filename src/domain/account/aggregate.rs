//! Account aggregate.
//!
//! # Invariants
//!
//! - `email` is unique across accounts (enforced by the store)
//! - `name` is never blank
//! - `enrolled_courses` holds each course at most once, in enrollment order
//! - `password_hash` never leaves the domain layer in responses

use crate::domain::foundation::{AccountId, CourseId, Timestamp, ValidationError};

use super::EmailAddress;

/// A registered user of the marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: EmailAddress,
    /// PHC-formatted credential hash.
    pub password_hash: String,
    pub photo_url: Option<String>,
    pub enrolled_courses: Vec<CourseId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Creates a freshly registered account with no enrollments.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` if the name is blank.
    pub fn register(
        name: &str,
        email: EmailAddress,
        password_hash: String,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: AccountId::new(),
            name: name.to_string(),
            email,
            password_hash,
            photo_url: None,
            enrolled_courses: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Renames the account. Blank or missing names keep the current one.
    ///
    /// Returns true if the name changed.
    pub fn rename(&mut self, name: Option<&str>) -> bool {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(new_name) if new_name != self.name => {
                self.name = new_name.to_string();
                self.updated_at = Timestamp::now();
                true
            }
            _ => false,
        }
    }

    /// Points the profile at a new photo, returning the previous URL.
    pub fn replace_photo(&mut self, url: impl Into<String>) -> Option<String> {
        self.updated_at = Timestamp::now();
        self.photo_url.replace(url.into())
    }

    /// Adds a course to the enrolled set.
    ///
    /// Returns false if the account was already enrolled.
    pub fn enroll(&mut self, course_id: CourseId) -> bool {
        if self.is_enrolled_in(&course_id) {
            return false;
        }
        self.enrolled_courses.push(course_id);
        self.updated_at = Timestamp::now();
        true
    }

    pub fn is_enrolled_in(&self, course_id: &CourseId) -> bool {
        self.enrolled_courses.contains(course_id)
    }
}
