//! Membership aggregate

pub mod model;

pub use model::{MembershipPlan, MembershipStatus, UserMembership};
