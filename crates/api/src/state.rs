use std::sync::Arc;

use rentshare_core::clock::Clock;
use rentshare_core::payment_window::PaymentWindowPolicy;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rentshare_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Time source for approvals and payment-window checks.
    pub clock: Arc<dyn Clock>,
    /// Payment window rules, shared with the expiry scheduler.
    pub payment_policy: Arc<PaymentWindowPolicy>,
}
