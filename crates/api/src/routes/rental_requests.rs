//! Route definitions for the `/rental-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rental_requests;
use crate::state::AppState;

/// Routes mounted at `/rental-requests`.
///
/// ```text
/// POST   /                      -> create_request
/// GET    /{id}                  -> get_request
/// POST   /{id}/approve          -> approve_request
/// POST   /{id}/deny             -> deny_request
/// POST   /{id}/cancel           -> cancel_request
/// POST   /{id}/pay              -> pay_request
/// POST   /{id}/complete         -> complete_request
/// GET    /{id}/payment-window   -> payment_window
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(rental_requests::create_request))
        .route("/{id}", get(rental_requests::get_request))
        .route("/{id}/approve", post(rental_requests::approve_request))
        .route("/{id}/deny", post(rental_requests::deny_request))
        .route("/{id}/cancel", post(rental_requests::cancel_request))
        .route("/{id}/pay", post(rental_requests::pay_request))
        .route("/{id}/complete", post(rental_requests::complete_request))
        .route("/{id}/payment-window", get(rental_requests::payment_window))
}
