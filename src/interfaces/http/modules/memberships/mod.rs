//! Membership plans and purchases

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
