//! Lecture entity.

use crate::domain::foundation::{CourseId, LectureId, Timestamp, ValidationError};

/// A single lecture belonging to a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lecture {
    pub id: LectureId,
    pub course_id: CourseId,
    pub title: String,
    pub video_url: Option<String>,
    /// Whether anyone may watch this lecture without being enrolled.
    pub is_preview_free: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lecture {
    /// Creates a locked lecture for the given course.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` if the title is blank.
    pub fn new(course_id: CourseId, title: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("lecture_title"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: LectureId::new(),
            course_id,
            title: title.to_string(),
            video_url: None,
            is_preview_free: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Marks the lecture as a free preview.
    ///
    /// Returns false if it already was one.
    pub fn unlock_preview(&mut self) -> bool {
        if self.is_preview_free {
            return false;
        }
        self.is_preview_free = true;
        self.updated_at = Timestamp::now();
        true
    }
}
