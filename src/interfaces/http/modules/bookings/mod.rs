//! Bookings and the swaps performed under them

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
