//! Database entities module

pub mod battery;
pub mod battery_type;
pub mod battery_used_history;
pub mod booking;
pub mod booking_detail;
pub mod cabinet;
pub mod membership_plan;
pub mod slot;
pub mod slot_history;
pub mod station;
pub mod transaction;
pub mod transfer_request;
pub mod transfer_request_detail;
pub mod user;
pub mod user_membership;
pub mod vehicle;
pub mod vehicle_type;

pub use battery::Entity as Battery;
pub use battery_type::Entity as BatteryType;
pub use booking::Entity as Booking;
pub use booking_detail::Entity as BookingDetail;
pub use cabinet::Entity as Cabinet;
pub use slot::Entity as Slot;
pub use station::Entity as Station;
pub use transaction::Entity as Transaction;
pub use transfer_request::Entity as TransferRequest;
pub use user::Entity as User;
pub use user_membership::Entity as UserMembership;
pub use vehicle::Entity as Vehicle;
