//! PostgreSQL implementation of AccountRepository.
//!
//! Accounts live in `accounts`; the enrolled-course set is read from
//! `course_enrollments` ordered by enrollment time.

use crate::domain::account::{Account, EmailAddress};
use crate::domain::foundation::{AccountId, CourseId, DomainError, ErrorCode, Timestamp};
use crate::ports::AccountRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn enrolled_courses(&self, account_id: Uuid) -> Result<Vec<CourseId>, DomainError> {
        let course_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT course_id
            FROM course_enrollments
            WHERE account_id = $1
            ORDER BY enrolled_at, course_id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load enrolled courses", e))?;

        Ok(course_ids.into_iter().map(CourseId::from_uuid).collect())
    }

    async fn hydrate(&self, row: Option<AccountRow>) -> Result<Option<Account>, DomainError> {
        match row {
            Some(row) => {
                let enrolled = self.enrolled_courses(row.id).await?;
                let mut account = Account::try_from(row)?;
                account.enrolled_courses = enrolled;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }
}

/// Database row representation of an account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::parse(&row.email).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored email: {}", e))
        })?;

        Ok(Account {
            id: AccountId::from_uuid(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
            photo_url: row.photo_url,
            enrolled_courses: Vec::new(),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn save(&self, account: &Account) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, photo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(&account.photo_url)
        .bind(account.created_at.as_datetime())
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("accounts_email_key") {
                    return DomainError::new(
                        ErrorCode::EmailTaken,
                        format!("Email already registered: {}", account.email),
                    );
                }
            }
            db_error("Failed to save account", e)
        })?;

        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                name = $2,
                photo_url = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.photo_url)
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update account", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", account.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, photo_url, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find account", e))?;

        self.hydrate(row).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, photo_url, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find account by email", e))?;

        self.hydrate(row).await
    }

    async fn add_enrolled_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
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
                    Some("course_enrollments_account_id_fkey") => {
                        return DomainError::new(
                            ErrorCode::AccountNotFound,
                            format!("Account not found: {}", account_id),
                        );
                    }
                    Some("course_enrollments_course_id_fkey") => {
                        return DomainError::new(
                            ErrorCode::CourseNotFound,
                            format!("Course not found: {}", course_id),
                        );
                    }
                    _ => {}
                }
            }
            db_error("Failed to add enrolled course", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: &str) -> AccountRow {
        let now = Utc::now();
        AccountRow {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            photo_url: Some("http://localhost:8080/media/abc.png".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_account() {
        let row = row("alice@example.com");
        let id = row.id;
        let account = Account::try_from(row).unwrap();

        assert_eq!(account.id, AccountId::from_uuid(id));
        assert_eq!(account.email.as_str(), "alice@example.com");
        assert!(account.enrolled_courses.is_empty());
    }

    #[test]
    fn corrupt_email_is_database_error() {
        let err = Account::try_from(row("not-an-email")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
