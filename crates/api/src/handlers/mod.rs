pub mod listings;
pub mod rental_requests;
