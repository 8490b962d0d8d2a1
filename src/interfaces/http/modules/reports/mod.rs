//! Swap and revenue reports (admin)

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
