//! Membership plans and purchases

mod service;

pub use service::{MembershipPurchase, MembershipService};
