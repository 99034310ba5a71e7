//! Rentshare domain core.
//!
//! Pure domain logic with no I/O: shared types, the error taxonomy, the
//! clock port, the rental-request state machine and the payment-window
//! evaluator. Used by the repository layer, the expiry worker and the API.

pub mod clock;
pub mod error;
pub mod payment_window;
pub mod rental;
pub mod types;
