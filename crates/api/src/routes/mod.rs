pub mod health;
pub mod listings;
pub mod rental_requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /listings                                   browse, create
/// /listings/{id}                              get
/// /listings/{id}/rental-requests              requests for a listing
///
/// /rental-requests                            submit
/// /rental-requests/{id}                       get
/// /rental-requests/{id}/approve               pending -> approved (POST)
/// /rental-requests/{id}/deny                  pending -> denied (POST)
/// /rental-requests/{id}/cancel                pending|approved -> cancelled (POST)
/// /rental-requests/{id}/pay                   approved -> paid (POST)
/// /rental-requests/{id}/complete              paid -> completed (POST)
/// /rental-requests/{id}/payment-window        deadline for an approved request
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/listings", listings::router())
        .nest("/rental-requests", rental_requests::router())
}
