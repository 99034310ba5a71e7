//! `/health`, the JSON fallback, and cross-cutting middleware behaviour.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, create_listing, create_request, get, post_empty};
use rentshare_api::config::ServerConfig;
use rentshare_worker::ExpiryConfig;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database_and_scheduler(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["expiry"]["enabled"], false);
    assert_eq!(json["expiry"]["interval_secs"], 300);
    assert_eq!(json["expiry"]["awaiting_payment"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reflects_configured_expiry(pool: PgPool) {
    let config = ServerConfig {
        expiry: ExpiryConfig {
            enabled: true,
            interval: Duration::from_secs(90),
        },
        ..common::test_config()
    };

    let app = common::build_test_app_with_config(pool, config);
    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["expiry"]["enabled"], true);
    assert_eq!(json["expiry"]["interval_secs"], 90);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_counts_requests_awaiting_payment(pool: PgPool) {
    let bike = create_listing(&pool, "Cargo bike").await;
    let tent = create_listing(&pool, "Camping tent").await;
    let approved = create_request(&pool, bike, "2024-01-10", "2024-01-12").await;
    create_request(&pool, tent, "2024-01-10", "2024-01-12").await;

    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rental-requests/{approved}/approve"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(common::build_test_app(pool), "/health").await).await;
    assert_eq!(json["expiry"]["awaiting_payment"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_json_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/bookings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No route for /api/v1/bookings");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn caller_request_id_is_echoed(pool: PgPool) {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "rent-42")
        .body(Body::empty())
        .unwrap();

    let response = common::build_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "rent-42");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preflight_allows_only_get_and_post(pool: PgPool) {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/rental-requests")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = common::build_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let allowed = response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap();
    assert!(allowed.contains("POST"));
    assert!(!allowed.contains("DELETE"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn browser_can_read_request_id(pool: PgPool) {
    let request = Request::builder()
        .uri("/api/v1/listings")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = common::build_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()["access-control-expose-headers"],
        "x-request-id"
    );
}
