//! Rentshare background worker.
//!
//! Hosts the [`ExpiryScheduler`], which expires approved rental requests
//! whose payment window has elapsed and reopens their listings. The API
//! server spawns it at boot; the `rentshare-worker` binary runs it on its own.

pub mod config;
pub mod expiry;
pub mod shutdown;
pub mod store;

pub use config::{ConfigError, ExpiryConfig};
pub use expiry::{ExpiryHandle, ExpiryScheduler, ExpirySummary};
pub use shutdown::shutdown_signal;
pub use store::{ExpiryStore, PgExpiryStore};
