#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use rentshare_core::clock::FixedClock;
use rentshare_core::payment_window::PaymentWindowPolicy;
use rentshare_worker::ExpiryConfig;
use sqlx::PgPool;
use tower::ServiceExt;

use rentshare_api::config::ServerConfig;
use rentshare_api::router::build_app_router;
use rentshare_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// The background expiry scheduler is disabled; tests drive it directly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        expiry: ExpiryConfig {
            enabled: false,
            ..ExpiryConfig::default()
        },
    }
}

/// Instant the default test clock is pinned to: 2024-01-01T00:00:00Z.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Build the full application router with the clock pinned to [`test_now`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_at(pool, test_now())
}

/// Build the full application router with the clock pinned to `now`.
pub fn build_test_app_at(pool: PgPool, now: DateTime<Utc>) -> Router {
    build_router(pool, test_config(), now)
}

/// Build the full application router from a custom configuration.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    build_router(pool, config, test_now())
}

fn build_router(pool: PgPool, config: ServerConfig, now: DateTime<Utc>) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(FixedClock::new(now)),
        payment_policy: Arc::new(PaymentWindowPolicy::default()),
    };
    build_app_router(state, &config)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request without a body.
pub async fn post_empty(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a listing through the API and return its id.
pub async fn create_listing(pool: &PgPool, title: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/listings",
        serde_json::json!({
            "owner_name": "Olive",
            "title": title,
            "description": "Well looked after",
            "daily_price_cents": 2500,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Submit a rental request through the API and return its id.
pub async fn create_request(pool: &PgPool, listing_id: i64, start_date: &str, end_date: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/rental-requests",
        serde_json::json!({
            "listing_id": listing_id,
            "renter_name": "Ravi",
            "start_date": start_date,
            "end_date": end_date,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
