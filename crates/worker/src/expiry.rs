//! Rental request payment-expiry scheduler.
//!
//! [`ExpiryScheduler`] periodically scans approved rental requests that have
//! not been paid, checks each one against the [`PaymentWindowPolicy`], and
//! expires those whose window has elapsed. Expiring a request also reopens
//! its listing; both writes are applied atomically by the [`ExpiryStore`].
//!
//! The scheduler runs once immediately on [`start`](ExpiryScheduler::start)
//! and then on a fixed interval until [`ExpiryHandle::stop`] is called.

use std::sync::Arc;
use std::time::Duration;

use rentshare_core::clock::{Clock, SystemClock};
use rentshare_core::payment_window::{denial_reason, PaymentWindowPolicy};
use rentshare_db::models::rental_request::ExpireOutcome;
use rentshare_db::DbPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::store::{ExpiryStore, PgExpiryStore};

/// Default time between scans.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Counts from a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirySummary {
    /// Approved, unpaid requests examined.
    pub scanned: usize,
    /// Requests moved to `expired`.
    pub expired: usize,
    /// Requests past their window that were paid or changed before the
    /// update landed.
    pub skipped: usize,
    /// Requests whose expiry failed and will be retried next run.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// ExpiryScheduler
// ---------------------------------------------------------------------------

/// Background service that expires approved rental requests left unpaid.
pub struct ExpiryScheduler {
    store: Arc<dyn ExpiryStore>,
    clock: Arc<dyn Clock>,
    policy: PaymentWindowPolicy,
    interval: Duration,
}

impl ExpiryScheduler {
    /// Create a scheduler over an arbitrary store and clock, with the default
    /// policy and a 5-minute interval.
    pub fn new(store: Arc<dyn ExpiryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: PaymentWindowPolicy::default(),
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Production wiring: PostgreSQL store and the system clock.
    pub fn for_pool(pool: DbPool) -> Self {
        Self::new(Arc::new(PgExpiryStore::new(pool)), Arc::new(SystemClock))
    }

    /// Set the time between scans. A zero interval is ignored and the
    /// previous value kept, since the ticker cannot run with a zero period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            tracing::warn!(
                interval_secs = self.interval.as_secs(),
                "Ignoring zero expiry interval, keeping current value"
            );
        } else {
            self.interval = interval;
        }
        self
    }

    pub fn with_policy(mut self, policy: PaymentWindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Spawn the scheduler loop on the current Tokio runtime.
    pub fn start(self) -> ExpiryHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let join = tokio::spawn(async move { self.run(token).await });
        ExpiryHandle { cancel, join }
    }

    /// Run the scan loop until `cancel` is triggered.
    ///
    /// The first scan happens immediately. A failed scan is logged and the
    /// loop waits for the next tick.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        // A slow scan pushes the next one back rather than triggering a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Request expiry scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Request expiry scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Request expiry scan failed");
                    }
                }
            }
        }
    }

    /// Perform one scan over all approved, unpaid requests.
    ///
    /// Returns `Err` only if the candidate list could not be loaded. Failures
    /// on individual requests are logged and counted in
    /// [`ExpirySummary::failed`].
    pub async fn run_once(&self) -> Result<ExpirySummary, sqlx::Error> {
        let candidates = self.store.list_candidates().await?;
        let now = self.clock.now();

        let mut summary = ExpirySummary {
            scanned: candidates.len(),
            ..ExpirySummary::default()
        };

        for candidate in &candidates {
            let evaluation =
                self.policy
                    .evaluate(candidate.approved_at, candidate.start_date, now);
            if !evaluation.expired {
                continue;
            }

            let reason = denial_reason(evaluation.window_hours);
            match self.store.expire(candidate.id, &reason, now).await {
                Ok(ExpireOutcome::Expired { listing_id }) => {
                    summary.expired += 1;
                    tracing::info!(
                        request_id = candidate.id,
                        listing_id,
                        window_hours = evaluation.window_hours,
                        "Rental request expired: payment window elapsed"
                    );
                }
                Ok(ExpireOutcome::Skipped) => {
                    summary.skipped += 1;
                    tracing::info!(
                        request_id = candidate.id,
                        "Rental request changed before expiry, skipped"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(
                        request_id = candidate.id,
                        error = %e,
                        "Failed to expire rental request"
                    );
                }
            }
        }

        if summary.expired > 0 {
            tracing::info!(
                expired = summary.expired,
                scanned = summary.scanned,
                "Expired unpaid rental requests"
            );
        } else {
            tracing::debug!(scanned = summary.scanned, "No requests expired");
        }

        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// ExpiryHandle
// ---------------------------------------------------------------------------

/// Handle to a running [`ExpiryScheduler`].
pub struct ExpiryHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ExpiryHandle {
    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A scan already in progress finishes its current `select!` arm first.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Request expiry scheduler task ended abnormally");
        }
    }

    /// Whether the loop task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
