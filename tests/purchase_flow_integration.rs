//! End-to-end purchase flow through the HTTP router.
//!
//! The application runs with in-memory repositories and real session,
//! hashing and Stripe adapters. Stripe itself is replaced by a local axum
//! server that records checkout requests, and webhooks are signed with the
//! same secret the adapter verifies against.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use course_market::adapters::auth::{Argon2CredentialHasher, JwtSessionService};
use course_market::adapters::http::{app_router, AccountAppState, PurchaseAppState, RouterSettings};
use course_market::adapters::media::InMemoryMediaStorage;
use course_market::adapters::memory::{
    InMemoryAccountRepository, InMemoryCourseRepository, InMemoryPurchaseRepository,
};
use course_market::adapters::stripe::{signature_header, StripeConfig, StripePaymentAdapter};
use course_market::application::CheckoutSettings;
use course_market::domain::account::{Account, EmailAddress};
use course_market::domain::catalog::{Course, Lecture};
use course_market::ports::{AccountRepository, CourseRepository};

const WEBHOOK_SECRET: &str = "whsec_integration_secret";
const SESSION_ID: &str = "cs_test_integration";
const CHECKOUT_URL: &str = "https://checkout.stripe.test/pay/cs_test_integration";

// =============================================================================
// Fake Stripe API
// =============================================================================

#[derive(Clone, Default)]
struct FakeStripe {
    requests: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl FakeStripe {
    fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

async fn create_session(
    State(fake): State<FakeStripe>,
    Form(params): Form<Vec<(String, String)>>,
) -> Json<Value> {
    fake.requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(params);

    Json(json!({
        "id": SESSION_ID,
        "url": CHECKOUT_URL,
        "status": "open",
        "metadata": {}
    }))
}

async fn spawn_fake_stripe() -> (String, FakeStripe) {
    let fake = FakeStripe::default();
    let router = Router::new()
        .route("/v1/checkout/sessions", post(create_session))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), fake)
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// Test Application
// =============================================================================

struct TestApp {
    router: Router,
    accounts: Arc<InMemoryAccountRepository>,
    courses: Arc<InMemoryCourseRepository>,
    purchases: Arc<InMemoryPurchaseRepository>,
    stripe: FakeStripe,
}

impl TestApp {
    async fn start() -> Self {
        let (stripe_url, stripe) = spawn_fake_stripe().await;

        let accounts = Arc::new(InMemoryAccountRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let purchases = Arc::new(InMemoryPurchaseRepository::new());
        let sessions = Arc::new(JwtSessionService::new(
            &SecretString::new("integration-signing-secret-0123456789".to_string()),
            3600,
        ));
        let payment_provider = Arc::new(
            StripePaymentAdapter::new(
                StripeConfig::new("sk_test_integration", WEBHOOK_SECRET)
                    .with_base_url(stripe_url)
                    .with_request_timeout(Duration::from_secs(5)),
            )
            .unwrap(),
        );

        let purchase_state = PurchaseAppState {
            accounts: accounts.clone(),
            courses: courses.clone(),
            purchases: purchases.clone(),
            payment_provider,
            checkout: CheckoutSettings {
                client_url: "http://localhost:5173/".to_string(),
                currency: "pkr".to_string(),
                allowed_countries: vec!["PK".to_string()],
            },
        };
        let account_state = AccountAppState {
            accounts: accounts.clone(),
            courses: courses.clone(),
            hasher: Arc::new(Argon2CredentialHasher::new()),
            sessions: sessions.clone(),
            media: Arc::new(InMemoryMediaStorage::new("http://localhost:8080/media")),
            cookie_secure: false,
        };
        let settings = RouterSettings {
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout: Duration::from_secs(10),
            media_dir: std::env::temp_dir(),
            max_upload_bytes: 1024 * 1024,
        };

        Self {
            router: app_router(purchase_state, account_state, sessions, &settings),
            accounts,
            courses,
            purchases,
            stripe,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Registers and logs in; returns the `token=...` cookie pair.
    async fn sign_in(&self, name: &str, email: &str) -> String {
        let (status, _) = self
            .send_json(post_json(
                "/api/v1/user/register",
                json!({"name": name, "email": email, "password": "correct horse"}),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, headers, _) = self
            .send(post_json(
                "/api/v1/user/login",
                json!({"email": email, "password": "correct horse"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);

        let set_cookie = headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// A 500 course with a free intro and a paid lecture.
    async fn seed_course(&self) -> (Course, Vec<Lecture>) {
        let creator = Account::register(
            "Instructor",
            EmailAddress::parse("instructor@example.com").unwrap(),
            "$argon2id$not-used".to_string(),
        )
        .unwrap();
        self.accounts.save(&creator).await.unwrap();

        let course = Course::new("Async Rust in Production", 500, creator.id)
            .unwrap()
            .with_thumbnail("https://cdn.example.com/async.png");
        self.courses.save(&course).await.unwrap();

        let mut intro = Lecture::new(course.id, "Welcome")
            .unwrap()
            .with_video("https://videos.example.com/welcome.mp4");
        intro.unlock_preview();
        let paid = Lecture::new(course.id, "Cancellation Safety")
            .unwrap()
            .with_video("https://videos.example.com/cancel.mp4");
        for lecture in [&intro, &paid] {
            self.courses.save_lecture(lecture).await.unwrap();
        }

        (course, vec![intro, paid])
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    with_cookie(
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
        cookie,
    )
}

fn signed_webhook(payload: &[u8], secret: &str) -> Request<Body> {
    let signature = signature_header(secret, chrono::Utc::now().timestamp(), payload);
    Request::builder()
        .method("POST")
        .uri("/api/v1/purchase/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header("stripe-signature", signature)
        .body(Body::from(payload.to_vec()))
        .unwrap()
}

fn checkout_completed(course: &Course, user_id: &str) -> Vec<u8> {
    json!({
        "id": "evt_integration_1",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": SESSION_ID,
                "amount_total": 50_000,
                "currency": "pkr",
                "payment_status": "paid",
                "status": "complete",
                "metadata": {
                    "courseId": course.id.to_string(),
                    "userId": user_id
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}

// =============================================================================
// Flow
// =============================================================================

#[tokio::test]
async fn checkout_and_webhook_unlock_the_course() {
    let app = TestApp::start().await;
    let cookie = app.sign_in("Alice", "alice@example.com").await;
    let (course, lectures) = app.seed_course().await;
    let detail_uri = format!("/api/v1/purchase/course/{}/detail-with-status", course.id);

    // Before purchase only the preview lecture is playable
    let (status, detail) = app.send_json(get(&detail_uri, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["purchased"], false);
    assert_eq!(detail["enrolled"], false);
    assert_eq!(detail["course"]["creator"]["name"], "Instructor");
    assert_eq!(detail["course"]["lectures"][0]["accessible"], true);
    assert_eq!(
        detail["course"]["lectures"][0]["videoUrl"],
        "https://videos.example.com/welcome.mp4"
    );
    assert_eq!(detail["course"]["lectures"][1]["accessible"], false);
    assert!(detail["course"]["lectures"][1].get("videoUrl").is_none());

    // Start checkout
    let (status, body) = app
        .send_json(with_cookie(
            post_json(
                "/api/v1/purchase/checkout/create-checkout-session",
                json!({"courseId": course.id.to_string()}),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "url": CHECKOUT_URL}));

    let requests = app.stripe.requests();
    assert_eq!(requests.len(), 1);
    let params = &requests[0];
    assert_eq!(param(params, "mode"), Some("payment"));
    assert_eq!(param(params, "line_items[0][price_data][unit_amount]"), Some("50000"));
    assert_eq!(param(params, "line_items[0][price_data][currency]"), Some("pkr"));
    assert_eq!(
        param(params, "success_url"),
        Some(format!("http://localhost:5173/course-progress/{}", course.id).as_str())
    );
    assert_eq!(
        param(params, "metadata[courseId]"),
        Some(course.id.to_string().as_str())
    );
    let user_id = param(params, "metadata[userId]").unwrap().to_string();

    let pending = app.purchases.all().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payment_id.as_deref(), Some(SESSION_ID));
    assert!(!pending[0].is_completed());

    // Stripe confirms payment
    let payload = checkout_completed(&course, &user_id);
    let (status, _, _) = app.send(signed_webhook(&payload, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, detail) = app.send_json(get(&detail_uri, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["purchased"], true);
    assert_eq!(detail["purchaseStatus"], "completed");
    assert_eq!(detail["enrolled"], true);
    for (i, lecture) in lectures.iter().enumerate() {
        let entry = &detail["course"]["lectures"][i];
        assert_eq!(entry["id"], lecture.id.to_string());
        assert_eq!(entry["accessible"], true);
        assert_eq!(entry["isPreviewFree"], true);
    }

    // Enrollment shows up on the profile
    let (status, profile) = app.send_json(get("/api/v1/user/profile", &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    let enrolled = profile["user"]["enrolledCourses"].as_array().unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0]["id"], course.id.to_string());

    // Completed purchases listing is public and reports major units
    let (status, listing) = app
        .send_json(Request::builder().uri("/api/v1/purchase").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    let purchased = listing["purchasedCourse"].as_array().unwrap();
    assert_eq!(purchased.len(), 1);
    assert_eq!(purchased[0]["amount"], 500.0);
    assert_eq!(purchased[0]["status"], "completed");
    assert_eq!(purchased[0]["course"]["title"], "Async Rust in Production");
}

#[tokio::test]
async fn redelivered_webhook_does_not_double_enroll() {
    let app = TestApp::start().await;
    let cookie = app.sign_in("Alice", "alice@example.com").await;
    let (course, _) = app.seed_course().await;

    let (status, _) = app
        .send_json(with_cookie(
            post_json(
                "/api/v1/purchase/checkout/create-checkout-session",
                json!({"courseId": course.id.to_string()}),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = param(&app.stripe.requests()[0], "metadata[userId]")
        .unwrap()
        .to_string();

    let payload = checkout_completed(&course, &user_id);
    for _ in 0..2 {
        let (status, _, _) = app.send(signed_webhook(&payload, WEBHOOK_SECRET)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let stored = app.courses.find_by_id(&course.id).await.unwrap().unwrap();
    assert_eq!(stored.enrolled_students.len(), 1);

    let (_, profile) = app.send_json(get("/api/v1/user/profile", &cookie)).await;
    assert_eq!(profile["user"]["enrolledCourses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_with_wrong_secret_is_rejected_as_text() {
    let app = TestApp::start().await;
    let (course, _) = app.seed_course().await;
    let payload = checkout_completed(&course, "someone");

    let (status, headers, body) = app
        .send(signed_webhook(&payload, "whsec_someone_else"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/plain")));
    assert!(String::from_utf8_lossy(&body).starts_with("Webhook error: "));
    assert!(app.purchases.all().await.is_empty());
}

#[tokio::test]
async fn webhook_without_signature_header_is_rejected() {
    let app = TestApp::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/purchase/webhook")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_for_unknown_course_is_404_and_skips_stripe() {
    let app = TestApp::start().await;
    let cookie = app.sign_in("Alice", "alice@example.com").await;

    let (status, body) = app
        .send_json(with_cookie(
            post_json(
                "/api/v1/purchase/checkout/create-checkout-session",
                json!({"courseId": "00000000-0000-4000-8000-000000000000"}),
            ),
            &cookie,
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Course not found!"}));
    assert!(app.stripe.requests().is_empty());
}

#[tokio::test]
async fn checkout_requires_a_session() {
    let app = TestApp::start().await;

    let (status, body) = app
        .send_json(post_json(
            "/api/v1/purchase/checkout/create-checkout-session",
            json!({"courseId": "anything"}),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not authenticated");
}

#[tokio::test]
async fn malformed_checkout_body_is_a_json_error() {
    let app = TestApp::start().await;
    let cookie = app.sign_in("Alice", "alice@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/purchase/checkout/create-checkout-session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"courseId\": "))
        .unwrap();
    let (status, body) = app.send_json(with_cookie(request, &cookie)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
    assert!(app.stripe.requests().is_empty());
}
