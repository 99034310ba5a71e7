//! Rental request and listing status constants, plus the request state
//! machine.
//!
//! Statuses are stored as lowercase text in `rental_requests.status` and
//! `listings.rental_status`.

// ---------------------------------------------------------------------------
// Rental request statuses
// ---------------------------------------------------------------------------

/// Submitted by a renter, awaiting the owner's decision.
pub const STATUS_PENDING: &str = "pending";

/// Accepted by the owner. The renter must pay within the payment window.
pub const STATUS_APPROVED: &str = "approved";

/// Rejected by the owner.
pub const STATUS_DENIED: &str = "denied";

/// Approved but not paid in time.
pub const STATUS_EXPIRED: &str = "expired";

/// Approved and paid.
pub const STATUS_PAID: &str = "paid";

/// The rental took place and the item was returned.
pub const STATUS_COMPLETED: &str = "completed";

/// Withdrawn by the renter before payment.
pub const STATUS_CANCELLED: &str = "cancelled";

// ---------------------------------------------------------------------------
// Payment statuses
// ---------------------------------------------------------------------------

/// Value written to `rental_requests.payment_status` once payment clears.
/// The column is NULL before that.
pub const PAYMENT_PAID: &str = "paid";

// ---------------------------------------------------------------------------
// Listing rental statuses
// ---------------------------------------------------------------------------

/// Open for booking.
pub const LISTING_AVAILABLE: &str = "available";

/// Held for an approved, unpaid request.
pub const LISTING_RESERVED: &str = "reserved";

/// Held for a paid request.
pub const LISTING_RENTED: &str = "rented";

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::*;

    /// Returns the set of statuses reachable from `from`.
    ///
    /// Terminal statuses (denied, expired, completed, cancelled) and unknown
    /// values return an empty slice.
    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            STATUS_PENDING => &[STATUS_APPROVED, STATUS_DENIED, STATUS_CANCELLED],
            STATUS_APPROVED => &[STATUS_PAID, STATUS_EXPIRED, STATUS_CANCELLED],
            STATUS_PAID => &[STATUS_COMPLETED],
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: &str, to: &str) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning an error message for invalid ones.
    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("Invalid transition: {from} -> {to}"))
        }
    }

    /// Whether no further transitions are possible from `status`.
    pub fn is_terminal(status: &str) -> bool {
        valid_transitions(status).is_empty()
    }
}
