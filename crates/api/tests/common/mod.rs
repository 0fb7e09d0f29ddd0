//! Shared test harness: router construction mirroring `main.rs`, request
//! helpers, and database fixtures.

// Each integration test binary compiles its own copy of this module and
// not every binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use servia_api::auth::jwt::{generate_access_token, JwtConfig};
use servia_api::config::{PaymentConfig, ServerConfig};
use servia_api::gateway::billing::BillingClient;
use servia_api::gateway::orders::OrdersClient;
use servia_api::router::build_app_router;
use servia_api::state::AppState;
use servia_api::ws::WsManager;
use servia_core::types::DbId;
use servia_events::EventBus;

/// Webhook signing secret used by payment tests.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// Build a test `ServerConfig` with safe defaults and known secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt_config(),
        payments: test_payment_config(),
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 60,
    }
}

pub fn test_payment_config() -> PaymentConfig {
    PaymentConfig {
        billing_base_url: "http://127.0.0.1:1".to_string(),
        billing_secret_key: "sk_test".to_string(),
        billing_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        plan_name: "Servia Professional".to_string(),
        plan_amount: 100,
        account_url: "http://localhost:5173/professional/account".to_string(),
        orders_base_url: "http://127.0.0.1:1".to_string(),
        orders_token: "orders_test".to_string(),
        orders_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        orders_notification_url: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the construction in `main.rs` so integration tests exercise
/// the same middleware stack that production uses. The gateway clients point
/// at an unroutable address; tests never make real provider calls.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
        billing: Arc::new(BillingClient::new(&config.payments)),
        orders: Arc::new(OrdersClient::new(&config.payments)),
        mailer: None,
    };
    build_app_router(state, &config)
}

/// A bearer token for the given user, signed with the test JWT secret.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_jwt_config())
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request and return the raw response.
pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    request(app, "GET", uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, "POST", uri, token, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    request(app, "POST", uri, token, None).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Assert a status and return the body for further checks.
pub async fn expect_status(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    let got = response.status();
    let body = body_json(response).await;
    assert_eq!(got, status, "unexpected status, body: {body}");
    body
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a confirmed account directly, returning its id.
pub async fn insert_user(pool: &PgPool, role: &str, credits: i32) -> DbId {
    insert_user_with_email(
        pool,
        role,
        credits,
        &format!("{}@example.com", uuid::Uuid::new_v4()),
    )
    .await
}

/// Insert a confirmed account with a specific email, returning its id.
pub async fn insert_user_with_email(
    pool: &PgPool,
    role: &str,
    credits: i32,
    email: &str,
) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO users
            (user_name, email, password_hash, role, phone, credits, email_confirmed)
         VALUES ($1, $2, 'x', $3, '11 99999-0000', $4, TRUE)
         RETURNING id",
    )
    .bind(format!("user-{role}"))
    .bind(email)
    .bind(role)
    .bind(credits)
    .fetch_one(pool)
    .await
    .expect("user fixture insert should succeed");
    row.0
}

/// Insert a pending service request, returning its id.
pub async fn insert_service(pool: &PgPool, client_id: DbId, value: i32) -> DbId {
    insert_service_with_category(pool, client_id, value, "general").await
}

/// Insert a pending service request with a category, returning its id.
pub async fn insert_service_with_category(
    pool: &PgPool,
    client_id: DbId,
    value: i32,
    category: &str,
) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO service_requests
            (title, description, category, urgency, address, status, client_id, value)
         VALUES ('Fix the sink', 'Leaky faucet', $1, 'high', 'Rua A, 1', 'pending', $2, $3)
         RETURNING id",
    )
    .bind(category)
    .bind(client_id)
    .bind(value)
    .fetch_one(pool)
    .await
    .expect("service fixture insert should succeed");
    row.0
}

/// Record an active (or customer-only) subscription for an account.
pub async fn insert_subscription(pool: &PgPool, user_id: DbId, active: bool) {
    let subscription_id = active.then(|| format!("sub_{user_id}"));
    sqlx::query(
        "INSERT INTO subscriptions (user_id, customer_id, subscription_id, price_id)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(format!("cus_{user_id}"))
    .bind(subscription_id)
    .bind(active.then_some("price_test"))
    .execute(pool)
    .await
    .expect("subscription fixture insert should succeed");
}

/// Insert a professional area, returning its id.
pub async fn insert_area(pool: &PgPool, name: &str) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO professional_areas (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .expect("area fixture insert should succeed");
    row.0
}

/// Current credit balance of an account.
pub async fn credits_of(pool: &PgPool, user_id: DbId) -> i32 {
    let row: (i32,) = sqlx::query_as("SELECT credits FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("credits lookup should succeed");
    row.0
}

/// (professional_slots, status) of a service request.
pub async fn service_state(pool: &PgPool, service_id: DbId) -> (i32, String) {
    sqlx::query_as("SELECT professional_slots, status FROM service_requests WHERE id = $1")
        .bind(service_id)
        .fetch_one(pool)
        .await
        .expect("service state lookup should succeed")
}
