//! Request and response DTOs for purchase endpoints.
//!
//! JSON field names are camelCase to match the web client.

use serde::{Deserialize, Serialize};

use crate::application::{CompletedPurchase, GetCourseDetailResult};
use crate::domain::account::Account;
use crate::domain::catalog::{Course, Lecture};
use crate::domain::purchase::Purchase;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for starting a checkout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub course_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a started checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub success: bool,
    pub url: String,
}

/// Public view of a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Price in major currency units.
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub creator_id: String,
    pub lecture_ids: Vec<String>,
    pub enrolled_students: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            title: course.title.clone(),
            subtitle: course.subtitle.clone(),
            price: course.price,
            thumbnail_url: course.thumbnail_url.clone(),
            creator_id: course.creator_id.to_string(),
            lecture_ids: course.lecture_ids.iter().map(ToString::to_string).collect(),
            enrolled_students: course.enrolled_students.iter().map(ToString::to_string).collect(),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

/// Course creator as shown on the detail page. Never carries the credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<&Account> for CreatorResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.as_str().to_string(),
            photo_url: account.photo_url.clone(),
        }
    }
}

/// A lecture with the caller's access resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LectureResponse {
    pub id: String,
    pub title: String,
    /// Only present when the caller may watch the lecture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub is_preview_free: bool,
    pub accessible: bool,
}

impl LectureResponse {
    fn new(lecture: &Lecture, accessible: bool) -> Self {
        Self {
            id: lecture.id.to_string(),
            title: lecture.title.clone(),
            video_url: lecture.video_url.clone().filter(|_| accessible),
            is_preview_free: lecture.is_preview_free,
            accessible,
        }
    }
}

/// Course with creator and lectures expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub creator: Option<CreatorResponse>,
    pub lectures: Vec<LectureResponse>,
}

/// Response for the course detail query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    pub course: CourseDetail,
    pub purchased: bool,
    pub purchase_status: Option<String>,
    pub enrolled: bool,
}

impl From<GetCourseDetailResult> for CourseDetailResponse {
    fn from(result: GetCourseDetailResult) -> Self {
        let lectures = result
            .lectures
            .iter()
            .map(|lecture| LectureResponse::new(lecture, result.can_access(lecture)))
            .collect();

        Self {
            course: CourseDetail {
                course: CourseResponse::from(&result.course),
                creator: result.creator.as_ref().map(CreatorResponse::from),
                lectures,
            },
            purchased: result.purchased,
            purchase_status: result.purchase_status.map(|s| s.as_str().to_string()),
            enrolled: result.enrolled,
        }
    }
}

/// A purchase row with its course expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: String,
    pub course_id: String,
    pub course: Option<CourseResponse>,
    pub user_id: String,
    /// Amount in major currency units.
    pub amount: f64,
    pub status: String,
    pub payment_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PurchaseResponse {
    fn new(purchase: &Purchase, course: Option<&Course>) -> Self {
        Self {
            id: purchase.id.to_string(),
            course_id: purchase.course_id.to_string(),
            course: course.map(CourseResponse::from),
            user_id: purchase.account_id.to_string(),
            amount: purchase.amount(),
            status: purchase.status.as_str().to_string(),
            payment_id: purchase.payment_id.clone(),
            created_at: purchase.created_at,
            updated_at: purchase.updated_at,
        }
    }
}

impl From<&CompletedPurchase> for PurchaseResponse {
    fn from(entry: &CompletedPurchase) -> Self {
        Self::new(&entry.purchase, entry.course.as_ref())
    }
}

/// Response for the completed purchase listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedCoursesResponse {
    pub purchased_course: Vec<PurchaseResponse>,
}

/// Body of webhook error responses: `{"message":...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookErrorResponse {
    pub message: String,
}
