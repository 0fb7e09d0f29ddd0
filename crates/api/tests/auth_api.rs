//! HTTP-level integration tests for registration, login, and the email
//! confirmation flow.

mod common;

use axum::http::StatusCode;
use common::{build_test_app, expect_status, get, insert_area, post_json};
use sqlx::PgPool;

fn register_body(email: &str, user_type: i32) -> serde_json::Value {
    serde_json::json!({
        "user_name": "Maria",
        "email": email,
        "password": "a-strong-password",
        "user_type": user_type,
        "phone": "11 98888-7777",
        "city": "São Paulo",
        "state": "SP",
    })
}

/// Fetch the stored confirmation code for an account.
async fn confirmation_code_of(pool: &PgPool, email: &str) -> String {
    let row: (Option<String>,) =
        sqlx::query_as("SELECT email_confirmation_code FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await
            .expect("code lookup should succeed");
    row.0.expect("account should hold a confirmation code")
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_client_returns_token_and_summary(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "maria@example.com");
    assert_eq!(body["user"]["role"], "client");
    // Sensitive fields never appear.
    assert!(body["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_email_conflicts(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Same address, different case: still a duplicate.
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("Maria@Example.com", 1),
    )
    .await;
    let body = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_professional_without_areas_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("pro@example.com", 2),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_professional_with_area_succeeds(pool: PgPool) {
    let area = insert_area(&pool, "plumbing").await;

    let mut body = register_body("pro@example.com", 2);
    body["professional_area_ids"] = serde_json::json!([area]);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        body,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["user"]["role"], "professional");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_with_unknown_area_is_rejected(pool: PgPool) {
    let mut body = register_body("pro@example.com", 2);
    body["professional_area_ids"] = serde_json::json!([999_999]);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        body,
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_with_invalid_role_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 3),
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// Login and confirmation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_is_rejected_until_email_confirmed(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let login = serde_json::json!({
        "email": "maria@example.com",
        "password": "a-strong-password",
    });

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        None,
        login.clone(),
    )
    .await;
    let body = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(body["code"], "EMAIL_NOT_CONFIRMED");

    // Confirm with the issued code, then login succeeds.
    let code = confirmation_code_of(&pool, "maria@example.com").await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/confirm-email",
        None,
        serde_json::json!({ "email": "maria@example.com", "code": code }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["confirmed"], true);

    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", None, login).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["token"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_confirmation_code_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let code = confirmation_code_of(&pool, "maria@example.com").await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/confirm-email",
        None,
        serde_json::json!({ "email": "maria@example.com", "code": wrong }),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INVALID_OR_EXPIRED_CODE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_confirmation_code_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Push the expiry into the past.
    sqlx::query(
        "UPDATE users SET email_confirmation_expires_at = NOW() - INTERVAL '5 minutes'
         WHERE email = $1",
    )
    .bind("maria@example.com")
    .execute(&pool)
    .await
    .unwrap();

    let code = confirmation_code_of(&pool, "maria@example.com").await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/confirm-email",
        None,
        serde_json::json!({ "email": "maria@example.com", "code": code }),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INVALID_OR_EXPIRED_CODE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn second_confirmation_is_idempotent(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let code = confirmation_code_of(&pool, "maria@example.com").await;
    let confirm = serde_json::json!({ "email": "maria@example.com", "code": code });

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/confirm-email",
        None,
        confirm.clone(),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // The code was cleared, but re-confirming stays a success.
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/confirm-email",
        None,
        confirm,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["confirmed"], true);
    assert_eq!(body["message"], "Email already confirmed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn resend_rotates_the_code_while_unconfirmed(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        register_body("maria@example.com", 1),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let first = confirmation_code_of(&pool, "maria@example.com").await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/resend-confirmation",
        None,
        serde_json::json!({ "email": "maria@example.com" }),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let second = confirmation_code_of(&pool, "maria@example.com").await;
    // A fresh code was issued (six digits; a collision is one in a million).
    assert_eq!(second.len(), 6);
    assert_ne!(first, second);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_profile_with_subscription_summary(pool: PgPool) {
    let user_id = common::insert_user_with_email(&pool, "professional", 75, "pro@example.com").await;
    common::insert_subscription(&pool, user_id, true).await;
    let token = common::token_for(user_id, "professional");

    let response = get(build_test_app(pool.clone()), "/api/v1/auth/me", Some(&token)).await;
    let body = expect_status(response, StatusCode::OK).await;

    assert_eq!(body["email"], "pro@example.com");
    assert_eq!(body["credits"], 75);
    assert_eq!(body["subscription"]["has_subscription"], true);
    assert!(body["client_services"].is_array());
    assert!(body["unlocked_services"].is_array());
    assert!(body.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_valid_token(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/api/v1/auth/me", None).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;

    let response = get(
        build_test_app(pool.clone()),
        "/api/v1/auth/me",
        Some("not-a-jwt"),
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}
