//! Row models and input DTOs.

pub mod listing;
pub mod rental_request;
