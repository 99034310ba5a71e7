//! Rental request models.

use rentshare_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `rental_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RentalRequest {
    pub id: DbId,
    pub listing_id: DbId,
    pub renter_name: String,
    pub status: String,
    pub payment_status: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub start_date: Date,
    pub end_date: Date,
    pub denial_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RentalRequest {
    /// When the request was approved. Rows approved before `approved_at`
    /// existed fall back to `updated_at`, the time of the last status change.
    pub fn approval_time(&self) -> Timestamp {
        self.approved_at.unwrap_or(self.updated_at)
    }
}

/// An approved, unpaid request as seen by the expiry scan.
#[derive(Debug, Clone, FromRow)]
pub struct ExpiryCandidate {
    pub id: DbId,
    pub listing_id: DbId,
    pub approved_at: Timestamp,
    pub start_date: Date,
}

/// DTO for submitting a rental request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct CreateRentalRequest {
    pub listing_id: DbId,
    #[validate(length(min = 1, max = 100))]
    pub renter_name: String,
    pub start_date: Date,
    pub end_date: Date,
}

fn validate_date_range(input: &CreateRentalRequest) -> Result<(), ValidationError> {
    if input.end_date < input.start_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some("end_date must not be before start_date".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for the deny endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DenyRentalRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Outcome of attempting to expire a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireOutcome {
    /// The request was expired and its listing reopened.
    Expired { listing_id: DbId },
    /// The request was no longer approved and unpaid when the update ran.
    Skipped,
}
