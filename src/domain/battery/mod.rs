//! Battery aggregate

pub mod model;

pub use model::{Battery, BatteryStatus, BatteryType};
