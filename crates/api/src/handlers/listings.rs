//! Handlers for browsing and creating listings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rentshare_core::error::CoreError;
use rentshare_core::types::DbId;
use rentshare_db::models::listing::{CreateListing, Listing, ListingFilter};
use rentshare_db::repositories::{ListingRepo, RentalRequestRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted free-text search term.
const MAX_SEARCH_LEN: usize = 200;

/// Load a listing or fail with 404.
pub async fn ensure_listing_exists(pool: &PgPool, id: DbId) -> AppResult<Listing> {
    ListingRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))
}

/// GET /api/v1/listings
///
/// Browse listings, optionally only available ones and/or matching `q`
/// against title and description.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> AppResult<impl IntoResponse> {
    if filter.q.as_ref().is_some_and(|q| q.chars().count() > MAX_SEARCH_LEN) {
        return Err(AppError::BadRequest(format!(
            "Search term must be at most {MAX_SEARCH_LEN} characters"
        )));
    }

    let listings = ListingRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: listings }))
}

/// POST /api/v1/listings
pub async fn create_listing(
    State(state): State<AppState>,
    Json(input): Json<CreateListing>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let listing = ListingRepo::create(&state.pool, &input).await?;

    tracing::info!(listing_id = listing.id, owner = %listing.owner_name, "Listing created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: listing })))
}

/// GET /api/v1/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ensure_listing_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// GET /api/v1/listings/{id}/rental-requests
///
/// All rental requests ever made against a listing, newest first.
pub async fn list_listing_requests(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_listing_exists(&state.pool, id).await?;

    let requests = RentalRequestRepo::list_for_listing(&state.pool, id).await?;
    Ok(Json(DataResponse { data: requests }))
}
