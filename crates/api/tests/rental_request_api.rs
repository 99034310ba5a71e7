//! HTTP-level integration tests for the rental request lifecycle.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::{body_json, create_listing, create_request, get, post_empty, post_json, test_now};
use rentshare_core::clock::FixedClock;
use rentshare_worker::{ExpiryScheduler, PgExpiryStore};
use sqlx::PgPool;

async fn approve(pool: &PgPool, request: i64) -> StatusCode {
    post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{request}/approve"),
    )
    .await
    .status()
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submitted_request_is_pending(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/rental-requests",
        serde_json::json!({
            "listing_id": listing,
            "renter_name": "Ravi",
            "start_date": "2024-01-10",
            "end_date": "2024-01-12",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["payment_status"].is_null());
    assert!(json["data"]["approved_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_for_unknown_listing_returns_404(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/rental-requests",
        serde_json::json!({
            "listing_id": 999999,
            "renter_name": "Ravi",
            "start_date": "2024-01-10",
            "end_date": "2024-01-12",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_is_rejected(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/rental-requests",
        serde_json::json!({
            "listing_id": listing,
            "renter_name": "Ravi",
            "start_date": "2024-01-12",
            "end_date": "2024-01-10",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_reserves_listing(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;

    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/rental-requests/{request}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["approved_at"], "2024-01-01T00:00:00Z");

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/listings/{listing}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["is_available"], false);
    assert_eq!(json["data"]["rental_status"], "reserved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approving_twice_returns_409(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;

    assert_eq!(approve(&pool, request).await, StatusCode::OK);
    assert_eq!(approve(&pool, request).await, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_request_cannot_be_approved_on_reserved_listing(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let first = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    let second = create_request(&pool, listing, "2024-01-20", "2024-01-22").await;

    assert_eq!(approve(&pool, first).await, StatusCode::OK);

    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{second}/approve"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approving_unknown_request_returns_404(pool: PgPool) {
    assert_eq!(approve(&pool, 999999).await, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deny_requires_reason(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{request}/deny"),
        serde_json::json!({ "reason": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/deny"),
        serde_json::json!({ "reason": "Already booked elsewhere" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "denied");
    assert_eq!(json["data"]["denial_reason"], "Already booked elsewhere");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelling_approved_request_reopens_listing(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{request}/cancel"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/listings/{listing}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["is_available"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pay_then_complete(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let response = post_empty(
        common::build_test_app_at(pool.clone(), test_now() + Duration::hours(3)),
        &format!("/api/v1/rental-requests/{request}/pay"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "paid");
    assert_eq!(json["data"]["payment_status"], "paid");

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/listings/{listing}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["rental_status"], "rented");

    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{request}/complete"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/listings/{listing}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["rental_status"], "available");
    assert_eq!(json["data"]["is_available"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn paying_pending_request_returns_409(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;

    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/pay"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_unpaid_request_returns_409(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/complete"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Payment window
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn payment_window_reports_deadline(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-04", "2024-01-05").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/payment-window"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["days_until_start"], 3);
    assert_eq!(json["data"]["window_hours"], 12);
    assert_eq!(json["data"]["deadline"], "2024-01-01T12:00:00Z");
    assert_eq!(json["data"]["expired"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payment_window_for_pending_request_returns_409(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-04", "2024-01-05").await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/payment-window"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn paying_after_window_lapsed_returns_409(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let late = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
    let response = post_empty(
        common::build_test_app_at(pool.clone(), late),
        &format!("/api/v1/rental-requests/{request}/pay"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The scan has not run yet, so the request is still approved.
    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/rental-requests/{request}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "approved");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_request_cannot_be_paid(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let late = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
    let summary = ExpiryScheduler::new(
        Arc::new(PgExpiryStore::new(pool.clone())),
        Arc::new(FixedClock::new(late)),
    )
    .run_once()
    .await
    .unwrap();
    assert_eq!(summary.expired, 1);

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/rental-requests/{request}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "expired");
    assert_eq!(
        json["data"]["denial_reason"],
        "Payment not received within 24 hours of approval"
    );

    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/pay"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_request_refuses_further_changes(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{request}/deny"),
        serde_json::json!({ "reason": "Away that week" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/rental-requests/{request}/cancel"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("already denied"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn transitions_are_stamped_with_the_app_clock(pool: PgPool) {
    let listing = create_listing(&pool, "Cargo bike").await;
    let request = create_request(&pool, listing, "2024-01-10", "2024-01-12").await;
    assert_eq!(approve(&pool, request).await, StatusCode::OK);

    let paid_at = test_now() + Duration::hours(2);
    let response = post_empty(
        common::build_test_app_at(pool, paid_at),
        &format!("/api/v1/rental-requests/{request}/pay"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["updated_at"], "2024-01-01T02:00:00Z");
}
