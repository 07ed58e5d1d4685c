//! PostgreSQL implementation of PurchaseRepository.

use crate::domain::foundation::{
    AccountId, CourseId, DomainError, ErrorCode, PurchaseId, Timestamp,
};
use crate::domain::purchase::{Purchase, PurchaseStatus};
use crate::ports::PurchaseRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PurchaseRepository port.
pub struct PostgresPurchaseRepository {
    pool: PgPool,
}

impl PostgresPurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a purchase.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    course_id: Uuid,
    account_id: Uuid,
    amount_minor: i64,
    status: String,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        let status: PurchaseStatus = row.status.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e))
        })?;

        Ok(Purchase {
            id: PurchaseId::from_uuid(row.id),
            course_id: CourseId::from_uuid(row.course_id),
            account_id: AccountId::from_uuid(row.account_id),
            amount_minor: row.amount_minor,
            status,
            payment_id: row.payment_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn rows_to_purchases(rows: Vec<PurchaseRow>) -> Result<Vec<Purchase>, DomainError> {
    rows.into_iter().map(Purchase::try_from).collect()
}

#[async_trait]
impl PurchaseRepository for PostgresPurchaseRepository {
    async fn save(&self, purchase: &Purchase) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, course_id, account_id, amount_minor, status, payment_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.course_id.as_uuid())
        .bind(purchase.account_id.as_uuid())
        .bind(purchase.amount_minor)
        .bind(purchase.status.as_str())
        .bind(&purchase.payment_id)
        .bind(purchase.created_at.as_datetime())
        .bind(purchase.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("purchases_payment_id_key") {
                    return DomainError::new(
                        ErrorCode::DuplicatePaymentId,
                        "Payment id already recorded",
                    );
                }
            }
            db_error("Failed to save purchase", e)
        })?;

        Ok(())
    }

    async fn update(&self, purchase: &Purchase) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                amount_minor = $2,
                status = $3,
                payment_id = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.amount_minor)
        .bind(purchase.status.as_str())
        .bind(&purchase.payment_id)
        .bind(purchase.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update purchase", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PurchaseNotFound,
                format!("Purchase not found: {}", purchase.id),
            ));
        }

        Ok(())
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, account_id, amount_minor, status, payment_id, created_at, updated_at
            FROM purchases
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find purchase", e))?;

        row.map(Purchase::try_from).transpose()
    }

    async fn find_by_account_and_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> Result<Vec<Purchase>, DomainError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, account_id, amount_minor, status, payment_id, created_at, updated_at
            FROM purchases
            WHERE account_id = $1 AND course_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find purchases", e))?;

        rows_to_purchases(rows)
    }

    async fn find_completed(&self) -> Result<Vec<Purchase>, DomainError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, account_id, amount_minor, status, payment_id, created_at, updated_at
            FROM purchases
            WHERE status = 'completed'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list completed purchases", e))?;

        rows_to_purchases(rows)
    }
}
