//! Repository for the `rental_requests` table.
//!
//! Every status change is a conditional update on the current status, so a
//! transition that lost a race affects zero rows and returns `None` (or
//! [`ExpireOutcome::Skipped`]) instead of overwriting the winner. Changes
//! that also touch the owning listing run in one transaction.

use rentshare_core::rental::{
    PAYMENT_PAID, STATUS_APPROVED, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_DENIED,
    STATUS_EXPIRED, STATUS_PAID, STATUS_PENDING,
};
use rentshare_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::rental_request::{
    CreateRentalRequest, ExpireOutcome, ExpiryCandidate, RentalRequest,
};
use crate::repositories::ListingRepo;

/// Column list for `rental_requests` queries.
const COLUMNS: &str = "id, listing_id, renter_name, status, payment_status, approved_at, \
    start_date, end_date, denial_reason, created_at, updated_at";

/// Provides lifecycle operations for rental requests.
pub struct RentalRequestRepo;

impl RentalRequestRepo {
    /// Submit a new request in `pending` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRentalRequest,
    ) -> Result<RentalRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO rental_requests (listing_id, renter_name, status, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(input.listing_id)
            .bind(&input.renter_name)
            .bind(STATUS_PENDING)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_requests WHERE id = $1");
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all requests for a listing, newest first.
    pub async fn list_for_listing(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Vec<RentalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_requests
             WHERE listing_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(listing_id)
            .fetch_all(pool)
            .await
    }

    /// Approved requests that have not been paid, oldest first.
    ///
    /// Rows without `approved_at` use `updated_at` as the approval time.
    pub async fn list_expiry_candidates(
        pool: &PgPool,
    ) -> Result<Vec<ExpiryCandidate>, sqlx::Error> {
        sqlx::query_as::<_, ExpiryCandidate>(
            "SELECT id, listing_id, COALESCE(approved_at, updated_at) AS approved_at, start_date
             FROM rental_requests
             WHERE status = $1 AND payment_status IS NULL
             ORDER BY id ASC",
        )
        .bind(STATUS_APPROVED)
        .fetch_all(pool)
        .await
    }

    /// Number of approved requests still waiting for payment.
    pub async fn count_awaiting_payment(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rental_requests
             WHERE status = $1 AND payment_status IS NULL",
        )
        .bind(STATUS_APPROVED)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Approve a pending request and reserve its listing.
    ///
    /// Returns `None` if the request is not pending or the listing is not
    /// available; nothing is written in that case.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        approved_at: Timestamp,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE rental_requests
             SET status = $2, approved_at = $3, updated_at = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        let approved = sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(approved_at)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = approved else {
            return Ok(None);
        };

        if !ListingRepo::reserve(&mut tx, request.listing_id, approved_at).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Deny a pending request with a reason shown to the renter.
    pub async fn deny(
        pool: &PgPool,
        id: DbId,
        reason: &str,
        now: Timestamp,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_requests
             SET status = $2, denial_reason = $3, updated_at = $5
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .bind(STATUS_DENIED)
            .bind(reason)
            .bind(STATUS_PENDING)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Withdraw a pending or approved-but-unpaid request.
    ///
    /// Cancelling an approved request reopens its listing.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM rental_requests
             WHERE id = $1 AND payment_status IS NULL
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let was_approved = match previous.as_ref().map(|(s,)| s.as_str()) {
            Some(STATUS_PENDING) => false,
            Some(STATUS_APPROVED) => true,
            _ => return Ok(None),
        };

        let query = format!(
            "UPDATE rental_requests
             SET status = $2, updated_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let cancelled = sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .bind(STATUS_CANCELLED)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        if was_approved {
            ListingRepo::reopen(&mut tx, cancelled.listing_id, now).await?;
        }

        tx.commit().await?;
        Ok(Some(cancelled))
    }

    /// Record payment for an approved request and mark its listing rented.
    ///
    /// Returns `None` if the request is no longer approved and unpaid, e.g.
    /// because the expiry scan got there first.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE rental_requests
             SET status = $2, payment_status = $3, updated_at = $5
             WHERE id = $1 AND status = $4 AND payment_status IS NULL
             RETURNING {COLUMNS}"
        );
        let paid = sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .bind(STATUS_PAID)
            .bind(PAYMENT_PAID)
            .bind(STATUS_APPROVED)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = paid else {
            return Ok(None);
        };

        ListingRepo::mark_rented(&mut tx, request.listing_id, now).await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Close out a paid rental and reopen the listing.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE rental_requests
             SET status = $2, updated_at = $4
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let completed = sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .bind(STATUS_COMPLETED)
            .bind(STATUS_PAID)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = completed else {
            return Ok(None);
        };

        ListingRepo::reopen(&mut tx, request.listing_id, now).await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Expire an approved, unpaid request and reopen its listing, in one
    /// transaction.
    ///
    /// The request update only applies while the row is still approved and
    /// unpaid; otherwise nothing is written and [`ExpireOutcome::Skipped`] is
    /// returned.
    pub async fn expire(
        pool: &PgPool,
        id: DbId,
        denial_reason: &str,
        now: Timestamp,
    ) -> Result<ExpireOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let expired: Option<(DbId,)> = sqlx::query_as(
            "UPDATE rental_requests
             SET status = $2, denial_reason = $3, updated_at = $4
             WHERE id = $1 AND status = $5 AND payment_status IS NULL
             RETURNING listing_id",
        )
        .bind(id)
        .bind(STATUS_EXPIRED)
        .bind(denial_reason)
        .bind(now)
        .bind(STATUS_APPROVED)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((listing_id,)) = expired else {
            return Ok(ExpireOutcome::Skipped);
        };

        ListingRepo::reopen(&mut tx, listing_id, now).await?;

        tx.commit().await?;
        Ok(ExpireOutcome::Expired { listing_id })
    }
}
