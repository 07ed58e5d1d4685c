//! ListCompletedPurchasesHandler - Query handler for the completed purchase ledger.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::catalog::Course;
use crate::domain::foundation::CourseId;
use crate::domain::purchase::{Purchase, PurchaseError};
use crate::ports::{CourseRepository, PurchaseRepository};

/// Query for all completed purchases.
#[derive(Debug, Clone, Default)]
pub struct ListCompletedPurchasesQuery;

/// A completed purchase with its course expanded.
#[derive(Debug, Clone)]
pub struct CompletedPurchase {
    pub purchase: Purchase,
    /// Absent if the course no longer exists.
    pub course: Option<Course>,
}

/// Completed purchases, newest first.
#[derive(Debug, Clone)]
pub struct ListCompletedPurchasesResult {
    pub purchases: Vec<CompletedPurchase>,
}

/// Handler for the completed purchase listing.
pub struct ListCompletedPurchasesHandler {
    purchases: Arc<dyn PurchaseRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl ListCompletedPurchasesHandler {
    pub fn new(purchases: Arc<dyn PurchaseRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { purchases, courses }
    }

    pub async fn handle(
        &self,
        _query: ListCompletedPurchasesQuery,
    ) -> Result<ListCompletedPurchasesResult, PurchaseError> {
        let purchases = self.purchases.find_completed().await?;

        let mut course_ids: Vec<CourseId> = purchases.iter().map(|p| p.course_id).collect();
        course_ids.sort();
        course_ids.dedup();

        let courses: HashMap<CourseId, Course> = self
            .courses
            .find_by_ids(&course_ids)
            .await?
            .into_iter()
            .map(|course| (course.id, course))
            .collect();

        let purchases = purchases
            .into_iter()
            .map(|purchase| CompletedPurchase {
                course: courses.get(&purchase.course_id).cloned(),
                purchase,
            })
            .collect();

        Ok(ListCompletedPurchasesResult { purchases })
    }
}
