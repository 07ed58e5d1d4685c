//! In-memory catalog store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::catalog::{Course, Lecture};
use crate::domain::foundation::{AccountId, CourseId, DomainError, ErrorCode, LectureId};
use crate::ports::CourseRepository;

#[derive(Debug, Default)]
struct Catalog {
    courses: HashMap<CourseId, Course>,
    lectures: HashMap<LectureId, Lecture>,
}

/// In-memory storage for courses and their lectures
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseRepository {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn course_not_found(id: &CourseId) -> DomainError {
    DomainError::new(ErrorCode::CourseNotFound, format!("Course not found: {}", id))
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn save(&self, course: &Course) -> Result<(), DomainError> {
        self.catalog
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        Ok(())
    }

    async fn save_lecture(&self, lecture: &Lecture) -> Result<(), DomainError> {
        let mut catalog = self.catalog.write().await;
        let course = catalog
            .courses
            .get_mut(&lecture.course_id)
            .ok_or_else(|| course_not_found(&lecture.course_id))?;
        course.add_lecture(lecture)?;
        catalog.lectures.insert(lecture.id, lecture.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.catalog.read().await.courses.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError> {
        let catalog = self.catalog.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| catalog.courses.get(id).cloned())
            .collect())
    }

    async fn find_lectures(&self, course_id: &CourseId) -> Result<Vec<Lecture>, DomainError> {
        let catalog = self.catalog.read().await;
        let Some(course) = catalog.courses.get(course_id) else {
            return Ok(Vec::new());
        };
        Ok(course
            .lecture_ids
            .iter()
            .filter_map(|id| catalog.lectures.get(id).cloned())
            .collect())
    }

    async fn unlock_lectures(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let mut catalog = self.catalog.write().await;
        let changed = catalog
            .lectures
            .values_mut()
            .filter(|lecture| &lecture.course_id == course_id)
            .map(|lecture| lecture.unlock_preview())
            .filter(|changed| *changed)
            .count();
        Ok(changed as u64)
    }

    async fn add_enrolled_student(
        &self,
        course_id: &CourseId,
        account_id: &AccountId,
    ) -> Result<bool, DomainError> {
        let mut catalog = self.catalog.write().await;
        let course = catalog
            .courses
            .get_mut(course_id)
            .ok_or_else(|| course_not_found(course_id))?;
        Ok(course.enroll_student(*account_id))
    }
}
