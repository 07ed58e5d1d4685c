//! PostgreSQL implementation of CourseRepository.
//!
//! A course's lecture outline comes from `lectures.position`; its student set
//! from `course_enrollments`.

use std::collections::HashMap;

use crate::domain::catalog::{Course, Lecture};
use crate::domain::foundation::{
    AccountId, CourseId, DomainError, ErrorCode, LectureId, Timestamp,
};
use crate::ports::CourseRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the CourseRepository port.
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach lecture outlines and student sets to course rows.
    async fn hydrate(&self, rows: Vec<CourseRow>) -> Result<Vec<Course>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let lecture_refs: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT course_id, id
            FROM lectures
            WHERE course_id = ANY($1)
            ORDER BY course_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load lecture outline", e))?;

        let student_refs: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT course_id, account_id
            FROM course_enrollments
            WHERE course_id = ANY($1)
            ORDER BY course_id, enrolled_at, account_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load enrolled students", e))?;

        let mut lectures: HashMap<Uuid, Vec<LectureId>> = HashMap::new();
        for (course_id, lecture_id) in lecture_refs {
            lectures
                .entry(course_id)
                .or_default()
                .push(LectureId::from_uuid(lecture_id));
        }

        let mut students: HashMap<Uuid, Vec<AccountId>> = HashMap::new();
        for (course_id, account_id) in student_refs {
            students
                .entry(course_id)
                .or_default()
                .push(AccountId::from_uuid(account_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let lecture_ids = lectures.remove(&row.id).unwrap_or_default();
                let enrolled_students = students.remove(&row.id).unwrap_or_default();
                let mut course = Course::from(row);
                course.lecture_ids = lecture_ids;
                course.enrolled_students = enrolled_students;
                course
            })
            .collect())
    }
}

/// Database row representation of a course.
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    subtitle: Option<String>,
    price: i64,
    thumbnail_url: Option<String>,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: CourseId::from_uuid(row.id),
            title: row.title,
            subtitle: row.subtitle,
            price: row.price,
            thumbnail_url: row.thumbnail_url,
            creator_id: AccountId::from_uuid(row.creator_id),
            lecture_ids: Vec::new(),
            enrolled_students: Vec::new(),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

/// Database row representation of a lecture.
#[derive(Debug, sqlx::FromRow)]
struct LectureRow {
    id: Uuid,
    course_id: Uuid,
    title: String,
    video_url: Option<String>,
    is_preview_free: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LectureRow> for Lecture {
    fn from(row: LectureRow) -> Self {
        Lecture {
            id: LectureId::from_uuid(row.id),
            course_id: CourseId::from_uuid(row.course_id),
            title: row.title,
            video_url: row.video_url,
            is_preview_free: row.is_preview_free,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn course_not_found(id: &CourseId) -> DomainError {
    DomainError::new(ErrorCode::CourseNotFound, format!("Course not found: {}", id))
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn save(&self, course: &Course) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO courses (
                id, title, subtitle, price, thumbnail_url, creator_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.title)
        .bind(&course.subtitle)
        .bind(course.price)
        .bind(&course.thumbnail_url)
        .bind(course.creator_id.as_uuid())
        .bind(course.created_at.as_datetime())
        .bind(course.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save course", e))?;

        Ok(())
    }

    async fn save_lecture(&self, lecture: &Lecture) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lectures (
                id, course_id, title, video_url, is_preview_free, position, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM lectures WHERE course_id = $2),
                $6, $7
            )
            "#,
        )
        .bind(lecture.id.as_uuid())
        .bind(lecture.course_id.as_uuid())
        .bind(&lecture.title)
        .bind(&lecture.video_url)
        .bind(lecture.is_preview_free)
        .bind(lecture.created_at.as_datetime())
        .bind(lecture.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("lectures_course_id_fkey") {
                    return course_not_found(&lecture.course_id);
                }
            }
            db_error("Failed to save lecture", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, title, subtitle, price, thumbnail_url, creator_id, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find course", e))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, title, subtitle, price, thumbnail_url, creator_id, created_at, updated_at
            FROM courses
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find courses", e))?;

        let mut by_id: HashMap<CourseId, Course> = self
            .hydrate(rows)
            .await?
            .into_iter()
            .map(|course| (course.id, course))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_lectures(&self, course_id: &CourseId) -> Result<Vec<Lecture>, DomainError> {
        let rows: Vec<LectureRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, title, video_url, is_preview_free, created_at, updated_at
            FROM lectures
            WHERE course_id = $1
            ORDER BY position
            "#,
        )
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find lectures", e))?;

        Ok(rows.into_iter().map(Lecture::from).collect())
    }

    async fn unlock_lectures(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE lectures SET
                is_preview_free = TRUE,
                updated_at = NOW()
            WHERE course_id = $1 AND is_preview_free = FALSE
            "#,
        )
        .bind(course_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to unlock lectures", e))?;

        Ok(result.rows_affected())
    }

    async fn add_enrolled_student(
        &self,
        course_id: &CourseId,
        account_id: &AccountId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO course_enrollments (account_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (account_id, course_id) DO NOTHING
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(course_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.constraint() {
                    Some("course_enrollments_course_id_fkey") => {
                        return course_not_found(course_id);
                    }
                    Some("course_enrollments_account_id_fkey") => {
                        return DomainError::new(
                            ErrorCode::AccountNotFound,
                            format!("Account not found: {}", account_id),
                        );
                    }
                    _ => {}
                }
            }
            db_error("Failed to add enrolled student", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_row_starts_without_outline() {
        let now = Utc::now();
        let row = CourseRow {
            id: Uuid::new_v4(),
            title: "Async Rust".to_string(),
            subtitle: None,
            price: 500,
            thumbnail_url: None,
            creator_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let course = Course::from(row);

        assert_eq!(course.price, 500);
        assert!(!course.has_lectures());
        assert!(course.enrolled_students.is_empty());
    }

    #[test]
    fn lecture_row_keeps_preview_flag() {
        let now = Utc::now();
        let course_id = Uuid::new_v4();
        let lecture = Lecture::from(LectureRow {
            id: Uuid::new_v4(),
            course_id,
            title: "Intro".to_string(),
            video_url: Some("https://videos.example.com/intro.mp4".to_string()),
            is_preview_free: true,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(lecture.course_id, CourseId::from_uuid(course_id));
        assert!(lecture.is_preview_free);
    }
}
