//! Payment window evaluation for approved rental requests.
//!
//! Once an owner approves a request, the renter has a limited time to pay.
//! The closer the rental starts, the shorter that window:
//!
//! | days until start | window   |
//! |------------------|----------|
//! | `>= 5`           | 24 hours |
//! | `2..5`           | 12 hours |
//! | otherwise        | 1 hour   |
//!
//! Days are counted from the approval instant to midnight UTC of the start
//! date and rounded up, so a start date already in the past yields zero or a
//! negative count and falls through to the shortest window.

use chrono::{Duration, NaiveTime};
use serde::Serialize;

use crate::types::{Date, Timestamp};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One row of the policy table: requests starting at least
/// `min_days_until_start` days after approval get `window` to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentWindowTier {
    pub min_days_until_start: i64,
    pub window: Duration,
}

/// Ordered payment-window tiers. The first tier whose threshold is met wins;
/// if none match, `fallback` applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentWindowPolicy {
    tiers: Vec<PaymentWindowTier>,
    fallback: Duration,
}

impl Default for PaymentWindowPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                PaymentWindowTier {
                    min_days_until_start: 5,
                    window: Duration::hours(24),
                },
                PaymentWindowTier {
                    min_days_until_start: 2,
                    window: Duration::hours(12),
                },
            ],
            fallback: Duration::hours(1),
        }
    }
}

/// Result of evaluating one approved request against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentWindowEvaluation {
    pub days_until_start: i64,
    /// Length of the payment window in whole hours.
    pub window_hours: i64,
    /// `approved_at + window`.
    pub deadline: Timestamp,
    /// `now` is strictly past the deadline.
    pub expired: bool,
}

impl PaymentWindowPolicy {
    /// Build a policy from explicit tiers. Tiers are checked in the order
    /// given.
    pub fn new(tiers: Vec<PaymentWindowTier>, fallback: Duration) -> Self {
        Self { tiers, fallback }
    }

    /// The payment window for a request starting `days_until_start` days
    /// after approval.
    pub fn window_for(&self, days_until_start: i64) -> Duration {
        self.tiers
            .iter()
            .find(|tier| days_until_start >= tier.min_days_until_start)
            .map(|tier| tier.window)
            .unwrap_or(self.fallback)
    }

    /// Evaluate a request approved at `approved_at` for a rental starting on
    /// `start_date`, as seen at `now`.
    pub fn evaluate(
        &self,
        approved_at: Timestamp,
        start_date: Date,
        now: Timestamp,
    ) -> PaymentWindowEvaluation {
        let days = days_until_start(approved_at, start_date);
        let window = self.window_for(days);
        let deadline = approved_at + window;

        PaymentWindowEvaluation {
            days_until_start: days,
            window_hours: window.num_hours(),
            deadline,
            expired: now > deadline,
        }
    }
}

/// Whole days from `approved_at` until midnight UTC of `start_date`, rounded
/// up. Negative when the start date is already behind the approval.
pub fn days_until_start(approved_at: Timestamp, start_date: Date) -> i64 {
    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let millis = (start - approved_at).num_milliseconds();

    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// User-facing reason stored on a request that expired unpaid.
pub fn denial_reason(window_hours: i64) -> String {
    let unit = if window_hours == 1 { "hour" } else { "hours" };
    format!("Payment not received within {window_hours} {unit} of approval")
}
