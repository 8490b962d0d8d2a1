//! Battery stock and battery types

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
