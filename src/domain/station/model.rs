//! Station, cabinet and slot domain entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::battery::BatteryStatus;
use crate::domain::geo::OpeningHours;
use crate::domain::{DomainError, DomainResult};

/// Operational state of a station or cabinet. Deactivation is a status
/// flip, rows are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Active,
    Inactive,
    Maintenance,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

impl FromStr for StationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "MAINTENANCE" => Ok(Self::Maintenance),
            other => Err(DomainError::bad_request(format!("Unknown station status: {}", other))),
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `HH:MM:SS`, `None` means open around the clock
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub status: StationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Station {
    pub fn is_active(&self) -> bool {
        self.status == StationStatus::Active
    }

    pub fn opening_hours(&self) -> DomainResult<Option<OpeningHours>> {
        match (&self.open_time, &self.close_time) {
            (Some(open), Some(close)) => OpeningHours::parse(open, close).map(Some),
            _ => Ok(None),
        }
    }
}

/// A station sub-unit holding slots for one battery type.
#[derive(Debug, Clone)]
pub struct Cabinet {
    pub id: i32,
    pub station_id: i32,
    pub battery_type_id: i32,
    pub name: String,
    pub status: StationStatus,
    pub created_at: DateTime<Utc>,
}

impl Cabinet {
    pub fn accepts(&self, battery_type_id: i32) -> bool {
        self.battery_type_id == battery_type_id
    }
}

/// Slot state. `Empty` and `Maintenance` hold no battery, every other
/// state describes the battery sitting in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    /// Holds a charged battery that can be booked
    Available,
    Reserved,
    Charging,
    DamagedBattery,
    Maintenance,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Charging => "CHARGING",
            Self::DamagedBattery => "DAMAGED_BATTERY",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    /// Whether a slot in this state must have no battery.
    pub fn is_vacant(&self) -> bool {
        matches!(self, Self::Empty | Self::Maintenance)
    }

    /// Slot state matching the battery placed into it.
    pub fn for_battery(status: BatteryStatus) -> Self {
        match status {
            BatteryStatus::Charging => Self::Charging,
            BatteryStatus::Damaged => Self::DamagedBattery,
            BatteryStatus::Reserved => Self::Reserved,
            _ => Self::Available,
        }
    }
}

impl FromStr for SlotStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPTY" => Ok(Self::Empty),
            "AVAILABLE" => Ok(Self::Available),
            "RESERVED" => Ok(Self::Reserved),
            "CHARGING" => Ok(Self::Charging),
            "DAMAGED_BATTERY" => Ok(Self::DamagedBattery),
            "MAINTENANCE" => Ok(Self::Maintenance),
            other => Err(DomainError::bad_request(format!("Unknown slot status: {}", other))),
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical bay holding at most one battery.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: i32,
    pub cabinet_id: i32,
    pub slot_number: i32,
    pub battery_id: Option<i32>,
    pub status: SlotStatus,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(cabinet_id: i32, slot_number: i32) -> Self {
        Self {
            id: 0,
            cabinet_id,
            slot_number,
            battery_id: None,
            status: SlotStatus::Empty,
            updated_at: Utc::now(),
        }
    }

    /// Battery presence agrees with the status.
    pub fn is_consistent(&self) -> bool {
        self.battery_id.is_none() == self.status.is_vacant()
    }

    pub fn reserve(&mut self) -> DomainResult<()> {
        if self.status != SlotStatus::Available || self.battery_id.is_none() {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not available (status: {})",
                self.id, self.status
            )));
        }
        self.status = SlotStatus::Reserved;
        Ok(())
    }

    /// Undo a reservation that was never picked up.
    pub fn release(&mut self) {
        if self.status == SlotStatus::Reserved && self.battery_id.is_some() {
            self.status = SlotStatus::Available;
        }
    }

    /// Take the battery out, leaving the slot empty.
    pub fn take_battery(&mut self) -> DomainResult<i32> {
        let Some(battery_id) = self.battery_id.take() else {
            return Err(DomainError::bad_request(format!("Slot {} holds no battery", self.id)));
        };
        self.status = SlotStatus::Empty;
        Ok(battery_id)
    }

    /// Place a battery into an empty slot.
    pub fn put_battery(
        &mut self,
        battery_id: i32,
        battery_status: BatteryStatus,
    ) -> DomainResult<()> {
        if self.status != SlotStatus::Empty || self.battery_id.is_some() {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not empty (status: {})",
                self.id, self.status
            )));
        }
        self.battery_id = Some(battery_id);
        self.status = SlotStatus::for_battery(battery_status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_with_battery(status: SlotStatus) -> Slot {
        Slot {
            id: 3,
            cabinet_id: 1,
            slot_number: 3,
            battery_id: Some(7),
            status,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_slot_is_empty_and_consistent() {
        let slot = Slot::new(1, 4);
        assert_eq!(slot.status, SlotStatus::Empty);
        assert!(slot.is_consistent());
    }

    #[test]
    fn reserve_requires_available_battery() {
        let mut slot = slot_with_battery(SlotStatus::Available);
        slot.reserve().unwrap();
        assert_eq!(slot.status, SlotStatus::Reserved);

        let mut charging = slot_with_battery(SlotStatus::Charging);
        assert!(charging.reserve().is_err());
        assert_eq!(charging.status, SlotStatus::Charging);
    }

    #[test]
    fn take_then_put_keeps_presence_consistent() {
        let mut slot = slot_with_battery(SlotStatus::Reserved);
        assert_eq!(slot.take_battery().unwrap(), 7);
        assert_eq!(slot.status, SlotStatus::Empty);
        assert!(slot.is_consistent());

        slot.put_battery(9, BatteryStatus::Charging).unwrap();
        assert_eq!(slot.battery_id, Some(9));
        assert_eq!(slot.status, SlotStatus::Charging);
        assert!(slot.is_consistent());
    }

    #[test]
    fn put_into_occupied_slot_fails_without_mutation() {
        let mut slot = slot_with_battery(SlotStatus::Available);
        assert!(slot.put_battery(9, BatteryStatus::Charging).is_err());
        assert_eq!(slot.battery_id, Some(7));
        assert_eq!(slot.status, SlotStatus::Available);
    }

    #[test]
    fn slot_status_follows_battery_status() {
        assert_eq!(SlotStatus::for_battery(BatteryStatus::Charging), SlotStatus::Charging);
        assert_eq!(SlotStatus::for_battery(BatteryStatus::Damaged), SlotStatus::DamagedBattery);
        assert_eq!(SlotStatus::for_battery(BatteryStatus::Available), SlotStatus::Available);
    }

    #[test]
    fn unknown_slot_status_is_rejected() {
        assert!("FULL".parse::<SlotStatus>().is_err());
        assert_eq!("DAMAGED_BATTERY".parse::<SlotStatus>().unwrap(), SlotStatus::DamagedBattery);
    }
}
