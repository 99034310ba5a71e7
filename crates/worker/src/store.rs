//! Persistence seam for the expiry scheduler.
//!
//! The scheduler only needs two things from storage: the current set of
//! approved, unpaid requests and an atomic "expire this one" operation.
//! [`PgExpiryStore`] provides both on top of [`RentalRequestRepo`].

use async_trait::async_trait;
use rentshare_core::types::{DbId, Timestamp};
use rentshare_db::models::rental_request::{ExpireOutcome, ExpiryCandidate};
use rentshare_db::repositories::RentalRequestRepo;
use rentshare_db::DbPool;

#[async_trait]
pub trait ExpiryStore: Send + Sync {
    /// Approved requests whose `payment_status` is still NULL.
    async fn list_candidates(&self) -> Result<Vec<ExpiryCandidate>, sqlx::Error>;

    /// Expire one request and reopen its listing, atomically, provided the
    /// request is still approved and unpaid.
    async fn expire(
        &self,
        request_id: DbId,
        denial_reason: &str,
        now: Timestamp,
    ) -> Result<ExpireOutcome, sqlx::Error>;
}

/// [`ExpiryStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgExpiryStore {
    pool: DbPool,
}

impl PgExpiryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpiryStore for PgExpiryStore {
    async fn list_candidates(&self) -> Result<Vec<ExpiryCandidate>, sqlx::Error> {
        RentalRequestRepo::list_expiry_candidates(&self.pool).await
    }

    async fn expire(
        &self,
        request_id: DbId,
        denial_reason: &str,
        now: Timestamp,
    ) -> Result<ExpireOutcome, sqlx::Error> {
        RentalRequestRepo::expire(&self.pool, request_id, denial_reason, now).await
    }
}
