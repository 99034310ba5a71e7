//! Handlers for the rental request lifecycle.
//!
//! Every transition is a conditional update in the repository layer. When a
//! repository call reports that nothing changed, [`explain_refusal`] reloads
//! the row to tell a missing request (404) apart from one in the wrong state
//! (409).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentshare_core::error::CoreError;
use rentshare_core::rental::{
    state_machine, STATUS_APPROVED, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_DENIED,
    STATUS_PAID,
};
use rentshare_core::types::DbId;
use rentshare_db::models::rental_request::{
    CreateRentalRequest, DenyRentalRequest, RentalRequest,
};
use rentshare_db::repositories::RentalRequestRepo;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::listings::ensure_listing_exists;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a rental request or fail with 404.
async fn ensure_request_exists(pool: &PgPool, id: DbId) -> AppResult<RentalRequest> {
    RentalRequestRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RentalRequest",
            id,
        }))
}

/// Build the error for a transition to `target` that updated no rows.
async fn explain_refusal(pool: &PgPool, id: DbId, target: &str) -> AppError {
    let current = match ensure_request_exists(pool, id).await {
        Ok(request) => request,
        Err(err) => return err,
    };

    if state_machine::is_terminal(&current.status) {
        return AppError::Core(CoreError::Conflict(format!(
            "Rental request {id} is already {} and can no longer change",
            current.status
        )));
    }

    if let Err(msg) = state_machine::validate_transition(&current.status, target) {
        return AppError::Core(CoreError::Conflict(msg));
    }

    if target == STATUS_APPROVED {
        return AppError::Core(CoreError::Conflict(format!(
            "Listing {} is not available",
            current.listing_id
        )));
    }

    AppError::Core(CoreError::Conflict(format!(
        "Rental request {id} changed while being updated"
    )))
}

/// Reject with 409 unless the request is approved and still unpaid.
fn ensure_awaiting_payment(request: &RentalRequest) -> AppResult<()> {
    if request.status != STATUS_APPROVED || request.payment_status.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Rental request {} is not awaiting payment (status: {})",
            request.id, request.status
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/rental-requests
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<CreateRentalRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    ensure_listing_exists(&state.pool, input.listing_id).await?;

    let request = RentalRequestRepo::create(&state.pool, &input).await?;

    tracing::info!(
        request_id = request.id,
        listing_id = request.listing_id,
        renter = %request.renter_name,
        "Rental request submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/rental-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = ensure_request_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rental-requests/{id}/approve
///
/// Approves a pending request and reserves its listing. The approval time
/// starts the payment window.
pub async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let approved_at = state.clock.now();

    let Some(request) = RentalRequestRepo::approve(&state.pool, id, approved_at).await? else {
        return Err(explain_refusal(&state.pool, id, STATUS_APPROVED).await);
    };

    let window = state
        .payment_policy
        .evaluate(approved_at, request.start_date, approved_at);

    tracing::info!(
        request_id = id,
        listing_id = request.listing_id,
        deadline = %window.deadline,
        window_hours = window.window_hours,
        "Rental request approved"
    );

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rental-requests/{id}/deny
pub async fn deny_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DenyRentalRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let now = state.clock.now();
    let Some(request) = RentalRequestRepo::deny(&state.pool, id, &input.reason, now).await? else {
        return Err(explain_refusal(&state.pool, id, STATUS_DENIED).await);
    };

    tracing::info!(request_id = id, listing_id = request.listing_id, "Rental request denied");

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rental-requests/{id}/cancel
pub async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let Some(request) = RentalRequestRepo::cancel(&state.pool, id, now).await? else {
        return Err(explain_refusal(&state.pool, id, STATUS_CANCELLED).await);
    };

    tracing::info!(
        request_id = id,
        listing_id = request.listing_id,
        "Rental request cancelled"
    );

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rental-requests/{id}/pay
///
/// Records payment for an approved request. A request whose payment window
/// has already lapsed is refused even if the expiry scan has not reached it
/// yet.
pub async fn pay_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let current = ensure_request_exists(&state.pool, id).await?;
    ensure_awaiting_payment(&current)?;

    let now = state.clock.now();
    let window = state
        .payment_policy
        .evaluate(current.approval_time(), current.start_date, now);
    if window.expired {
        tracing::info!(
            request_id = id,
            deadline = %window.deadline,
            "Payment refused after window lapsed"
        );
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Payment window for rental request {id} closed at {}",
            window.deadline
        ))));
    }

    let Some(request) = RentalRequestRepo::mark_paid(&state.pool, id, now).await? else {
        return Err(explain_refusal(&state.pool, id, STATUS_PAID).await);
    };

    tracing::info!(request_id = id, listing_id = request.listing_id, "Rental request paid");

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rental-requests/{id}/complete
pub async fn complete_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let Some(request) = RentalRequestRepo::complete(&state.pool, id, now).await? else {
        return Err(explain_refusal(&state.pool, id, STATUS_COMPLETED).await);
    };

    tracing::info!(
        request_id = id,
        listing_id = request.listing_id,
        "Rental completed"
    );

    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/rental-requests/{id}/payment-window
///
/// Deadline and tier for a request that is awaiting payment.
pub async fn payment_window(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = ensure_request_exists(&state.pool, id).await?;
    ensure_awaiting_payment(&request)?;

    let window = state.payment_policy.evaluate(
        request.approval_time(),
        request.start_date,
        state.clock.now(),
    );

    Ok(Json(DataResponse { data: window }))
}
