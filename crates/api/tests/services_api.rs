//! HTTP-level integration tests for the unlock/settlement endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, credits_of, expect_status, get, insert_service, insert_subscription,
    insert_user, post_empty, service_state, token_for,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Standard unlock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unlock_with_exact_credits_debits_to_zero(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 150).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    // Contact revealed.
    assert!(body["data"]["contact"]["email"].is_string());
    assert!(body["data"]["contact"]["phone"].is_string());

    // Full debit, one slot taken, still pending.
    assert_eq!(credits_of(&pool, professional).await, 0);
    let (slots, status) = service_state(&pool, service).await;
    assert_eq!(slots, 1);
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_unlock_is_idempotent(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 150).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");
    let uri = format!("/api/v1/services/{service}/unlock");

    let response = post_empty(build_test_app(pool.clone()), &uri, Some(&token)).await;
    expect_status(response, StatusCode::OK).await;

    // Second call: same result, no second debit, no second increment.
    let response = post_empty(build_test_app(pool.clone()), &uri, Some(&token)).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["data"]["contact"]["email"].is_string());

    assert_eq!(credits_of(&pool, professional).await, 0);
    let (slots, _) = service_state(&pool, service).await;
    assert_eq!(slots, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlock_without_entitlement_is_denied(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 149).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INSUFFICIENT_ENTITLEMENT");

    // Nothing written.
    assert_eq!(credits_of(&pool, professional).await, 149);
    let (slots, status) = service_state(&pool, service).await;
    assert_eq!(slots, 0);
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn subscription_covers_unlock_without_debiting(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 40).await;
    insert_subscription(&pool, professional, true).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Balance untouched even though it could not cover the cost.
    assert_eq!(credits_of(&pool, professional).await, 40);
    let (slots, _) = service_state(&pool, service).await;
    assert_eq!(slots, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn customer_record_without_subscription_does_not_entitle(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 0).await;
    // Customer id exists but no active subscription.
    insert_subscription(&pool, professional, false).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INSUFFICIENT_ENTITLEMENT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fourth_unlock_closes_the_request(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let service = insert_service(&pool, client, 10).await;

    // Three professionals unlock; the request stays open.
    for _ in 0..3 {
        let professional = insert_user(&pool, "professional", 100).await;
        let token = token_for(professional, "professional");
        let response = post_empty(
            build_test_app(pool.clone()),
            &format!("/api/v1/services/{service}/unlock"),
            Some(&token),
        )
        .await;
        expect_status(response, StatusCode::OK).await;
    }
    let (slots, status) = service_state(&pool, service).await;
    assert_eq!(slots, 3);
    assert_eq!(status, "pending");

    // The fourth unlock reaches the cap and closes it.
    let fourth = insert_user(&pool, "professional", 100).await;
    let token = token_for(fourth, "professional");
    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let (slots, status) = service_state(&pool, service).await;
    assert_eq!(slots, 4);
    assert_eq!(status, "closed");

    // The counter always equals the number of distinct unlock holders.
    let holders = servia_db::repositories::UnlockRepo::count_by_service(&pool, service)
        .await
        .unwrap();
    assert_eq!(holders, 4);

    // A fifth professional is rejected.
    let fifth = insert_user(&pool, "professional", 100).await;
    let token = token_for(fifth, "professional");
    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::CONFLICT).await;
    let (slots, _) = service_state(&pool, service).await;
    assert_eq!(slots, 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn legacy_zero_value_row_settles_at_default_cost(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 60).await;
    let service = insert_service(&pool, client, 0).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    // Default cost (50) debited and the stored value repaired.
    assert_eq!(credits_of(&pool, professional).await, 10);
    assert_eq!(body["data"]["value"], 50);
}

// ---------------------------------------------------------------------------
// Exclusive unlock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn exclusive_unlock_closes_immediately(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 200).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/exclusive"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["data"]["contact"]["email"].is_string());

    assert_eq!(credits_of(&pool, professional).await, 50);
    let (slots, status) = service_state(&pool, service).await;
    assert_eq!(slots, 1);
    assert_eq!(status, "closed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn exclusive_unlock_debits_even_with_subscription(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 150).await;
    insert_subscription(&pool, professional, true).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/exclusive"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Exclusivity is never subscription-covered.
    assert_eq!(credits_of(&pool, professional).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn exclusive_unlock_requires_credits_despite_subscription(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 0).await;
    insert_subscription(&pool, professional, true).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/exclusive"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INSUFFICIENT_CREDITS");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn exclusive_unavailable_once_anyone_unlocked(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let first = insert_user(&pool, "professional", 100).await;
    let second = insert_user(&pool, "professional", 10_000).await;
    let service = insert_service(&pool, client, 50).await;

    let token = token_for(first, "professional");
    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // A large balance does not help once the counter is above zero.
    let token = token_for(second, "professional");
    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/exclusive"),
        Some(&token),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "EXCLUSIVITY_UNAVAILABLE");
    assert_eq!(credits_of(&pool, second).await, 10_000);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn exclusive_unlock_is_idempotent(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 300).await;
    let service = insert_service(&pool, client, 150).await;
    let token = token_for(professional, "professional");
    let uri = format!("/api/v1/services/{service}/exclusive");

    let response = post_empty(build_test_app(pool.clone()), &uri, Some(&token)).await;
    expect_status(response, StatusCode::OK).await;

    // The holder retries against the now-closed request: success, no
    // re-charge.
    let response = post_empty(build_test_app(pool.clone()), &uri, Some(&token)).await;
    expect_status(response, StatusCode::OK).await;
    assert_eq!(credits_of(&pool, professional).await, 150);
}

// ---------------------------------------------------------------------------
// Detail view and access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn detail_withholds_contact_until_unlocked(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let professional = insert_user(&pool, "professional", 100).await;
    let service = insert_service(&pool, client, 50).await;
    let token = token_for(professional, "professional");
    let uri = format!("/api/v1/services/{service}");

    let response = get(build_test_app(pool.clone()), &uri, Some(&token)).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["data"]["contact"].is_null());

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let response = get(build_test_app(pool.clone()), &uri, Some(&token)).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["data"]["contact"]["email"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clients_cannot_use_professional_endpoints(pool: PgPool) {
    let client = insert_user(&pool, "client", 1_000).await;
    let service = insert_service(&pool, client, 50).await;
    let token = token_for(client, "client");

    for uri in [
        format!("/api/v1/services/{service}/unlock"),
        format!("/api/v1/services/{service}/exclusive"),
    ] {
        let response = post_empty(build_test_app(pool.clone()), &uri, Some(&token)).await;
        expect_status(response, StatusCode::FORBIDDEN).await;
    }

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}"),
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlock_unknown_service_is_404(pool: PgPool) {
    let professional = insert_user(&pool, "professional", 100).await;
    let token = token_for(professional, "professional");

    let response = post_empty(
        build_test_app(pool.clone()),
        "/api/v1/services/999999/unlock",
        Some(&token),
    )
    .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unlock_requires_authentication(pool: PgPool) {
    let client = insert_user(&pool, "client", 0).await;
    let service = insert_service(&pool, client, 50).await;

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/services/{service}/unlock"),
        None,
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}
