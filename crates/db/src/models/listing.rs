//! Listing models.

use rentshare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    pub owner_name: String,
    pub title: String,
    pub description: Option<String>,
    pub daily_price_cents: i64,
    pub is_available: bool,
    pub rental_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new listing.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListing {
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub daily_price_cents: i64,
}

/// Filters for browsing listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    /// Only listings open for booking.
    pub available: Option<bool>,
    /// Case-insensitive match on title or description.
    pub q: Option<String>,
}
