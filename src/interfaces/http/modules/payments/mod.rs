//! Payment transactions and gateway callbacks

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
