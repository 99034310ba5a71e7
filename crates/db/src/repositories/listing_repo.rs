//! Repository for the `listings` table.

use rentshare_core::rental::{LISTING_AVAILABLE, LISTING_RENTED, LISTING_RESERVED};
use rentshare_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::listing::{CreateListing, Listing, ListingFilter};

/// Column list for `listings` queries.
const COLUMNS: &str = "id, owner_name, title, description, daily_price_cents, \
    is_available, rental_status, created_at, updated_at";

/// Provides CRUD operations and availability changes for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Insert a new listing, open for booking.
    pub async fn create(pool: &PgPool, input: &CreateListing) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings (owner_name, title, description, daily_price_cents)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.owner_name)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.daily_price_cents)
            .fetch_one(pool)
            .await
    }

    /// Find a listing by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Browse listings, newest first.
    ///
    /// `filter.q` is a literal substring matched against title or description
    /// case-insensitively; `%` and `_` carry no wildcard meaning.
    pub async fn list(pool: &PgPool, filter: &ListingFilter) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             WHERE ($1::BOOLEAN IS NULL OR is_available = $1)
               AND ($2::TEXT IS NULL
                    OR title ILIKE '%' || $2 || '%' ESCAPE '\\'
                    OR description ILIKE '%' || $2 || '%' ESCAPE '\\')
             ORDER BY created_at DESC, id DESC"
        );
        let q = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_like);
        sqlx::query_as::<_, Listing>(&query)
            .bind(filter.available)
            .bind(q)
            .fetch_all(pool)
            .await
    }

    /// Take an available listing off the market for an approved request.
    ///
    /// Returns `false` if the listing was not available.
    pub async fn reserve(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings
             SET is_available = FALSE, rental_status = $2, updated_at = $3
             WHERE id = $1 AND is_available",
        )
        .bind(id)
        .bind(LISTING_RESERVED)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a reserved listing as rented once payment clears.
    pub async fn mark_rented(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE listings
             SET is_available = FALSE, rental_status = $2, updated_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(LISTING_RENTED)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Put a listing back on the market.
    pub async fn reopen(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE listings
             SET is_available = TRUE, rental_status = $2, updated_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(LISTING_AVAILABLE)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(())
    }
}

/// Escape `LIKE` metacharacters so `input` matches literally under
/// `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
