//! Liveness endpoint. Reports database reachability and the state of the
//! background request expiry scheduler.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use rentshare_db::repositories::RentalRequestRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub expiry: ExpiryStatus,
}

/// Scheduler settings plus the backlog it is watching.
#[derive(Serialize)]
pub struct ExpiryStatus {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Approved requests not yet paid. `None` if the database is unreachable.
    pub awaiting_payment: Option<i64>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = rentshare_db::health_check(&state.pool).await.is_ok();

    let awaiting_payment = if db_healthy {
        match RentalRequestRepo::count_awaiting_payment(&state.pool).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to count requests awaiting payment");
                None
            }
        }
    } else {
        None
    };

    let expiry = &state.config.expiry;

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        expiry: ExpiryStatus {
            enabled: expiry.enabled,
            interval_secs: expiry.interval.as_secs(),
            awaiting_payment,
        },
    })
}

/// `GET /health`, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
