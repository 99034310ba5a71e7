//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod listing_repo;
pub mod rental_request_repo;

pub use listing_repo::ListingRepo;
pub use rental_request_repo::RentalRequestRepo;
