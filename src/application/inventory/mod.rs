//! Stations, cabinets, batteries and vehicles: the physical inventory
//! behind the swap workflows, plus reporting over it.

mod battery;
mod report;
mod station;
mod vehicle;

pub use battery::{BatteryService, NewBatteryPlacement};
pub use report::{ReportService, StationSwaps, SwapReport};
pub use station::{
    CabinetSlots, NearbyStation, SlotView, StationDetail, StationService, StationUpdate,
};
pub use vehicle::VehicleService;
