pub mod auth;
pub mod batteries;
pub mod bookings;
pub mod health;
pub mod memberships;
pub mod metrics;
pub mod payments;
pub mod reports;
pub mod request_id;
pub mod stations;
pub mod transfers;
pub mod vehicles;
