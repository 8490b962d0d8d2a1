//! Payment settlement and checkout links

mod service;

pub use service::{CheckoutUrls, PaymentService};
