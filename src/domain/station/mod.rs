//! Station aggregate: stations, cabinets and slots.

pub mod model;

pub use model::{Cabinet, Slot, SlotStatus, Station, StationStatus};
