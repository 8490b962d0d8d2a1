//! Booking aggregate
//!
//! A booking reserves one battery per detail at a station. Details progress
//! independently; the booking completes when the last one does.

pub mod model;

pub use model::{settled_status, Booking, BookingDetail, BookingDetailStatus, BookingStatus};
