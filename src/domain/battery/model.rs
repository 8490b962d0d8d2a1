//! Battery domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::charging::{estimated_full_charge_at, HealthScorer};
use crate::domain::{DomainError, DomainResult};

/// Battery lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Available,
    InUse,
    Charging,
    Reserved,
    Damaged,
    /// Taken out of service. Batteries are never deleted.
    Retired,
}

impl BatteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
            Self::Charging => "CHARGING",
            Self::Reserved => "RESERVED",
            Self::Damaged => "DAMAGED",
            Self::Retired => "RETIRED",
        }
    }
}

impl FromStr for BatteryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "IN_USE" => Ok(Self::InUse),
            "CHARGING" => Ok(Self::Charging),
            "RESERVED" => Ok(Self::Reserved),
            "DAMAGED" => Ok(Self::Damaged),
            "RETIRED" => Ok(Self::Retired),
            other => Err(DomainError::bad_request(format!("Unknown battery status: {}", other))),
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BatteryType {
    pub id: i32,
    pub name: String,
    pub capacity_kwh: f64,
    /// Hours from empty to full; `None` uses the configured default
    pub charge_rate_hours: Option<f64>,
    /// Price of one swap in VND
    pub swap_price: i64,
}

#[derive(Debug, Clone)]
pub struct Battery {
    pub id: i32,
    pub battery_type_id: i32,
    pub serial_number: String,
    pub model: String,
    /// Current charge, percent
    pub capacity: f64,
    pub cycle_count: i32,
    pub health_score: f64,
    pub status: BatteryStatus,
    pub vehicle_id: Option<i32>,
    pub in_transfer: bool,
    pub estimated_full_charge_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Battery {
    /// Status and owning vehicle agree: `IN_USE` needs a vehicle,
    /// `AVAILABLE`/`CHARGING` must not have one.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            BatteryStatus::InUse => self.vehicle_id.is_some(),
            BatteryStatus::Available | BatteryStatus::Charging => self.vehicle_id.is_none(),
            _ => true,
        }
    }

    pub fn reserve(&mut self) -> DomainResult<()> {
        if self.status != BatteryStatus::Available
            || self.vehicle_id.is_some()
            || self.in_transfer
        {
            return Err(DomainError::bad_request(format!(
                "Battery {} is not available",
                self.id
            )));
        }
        self.status = BatteryStatus::Reserved;
        Ok(())
    }

    /// Return a reserved battery to the pool.
    pub fn release(&mut self) {
        if self.status == BatteryStatus::Reserved {
            self.status = BatteryStatus::Available;
        }
    }

    /// Hand the battery to a vehicle at pickup: bumps the cycle count and
    /// recomputes health.
    pub fn attach_to_vehicle(&mut self, vehicle_id: i32, scorer: &dyn HealthScorer) {
        self.vehicle_id = Some(vehicle_id);
        self.status = BatteryStatus::InUse;
        self.cycle_count += 1;
        self.health_score = scorer.score(self.cycle_count, self.capacity);
        self.estimated_full_charge_at = None;
    }

    /// Detach from the vehicle and start charging in a slot.
    pub fn start_charging(
        &mut self,
        now: DateTime<Utc>,
        charge_rate_hours: Option<f64>,
    ) -> DomainResult<()> {
        let eta = estimated_full_charge_at(now, self.capacity, charge_rate_hours)?;
        self.vehicle_id = None;
        self.status = BatteryStatus::Charging;
        self.estimated_full_charge_at = Some(eta);
        Ok(())
    }

    pub fn finish_charging(&mut self) {
        if self.status == BatteryStatus::Charging {
            self.status = BatteryStatus::Available;
            self.capacity = 100.0;
            self.estimated_full_charge_at = None;
        }
    }

    /// Staff may relocate damaged batteries or ones nobody is using.
    pub fn can_leave_for_transfer(&self) -> bool {
        match self.status {
            BatteryStatus::Damaged => true,
            BatteryStatus::Available | BatteryStatus::Charging => self.vehicle_id.is_none(),
            _ => false,
        }
    }

    pub fn can_enter_from_transfer(&self) -> bool {
        matches!(
            self.status,
            BatteryStatus::Available | BatteryStatus::Charging | BatteryStatus::Damaged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charging::LinearHealthScorer;
    use chrono::Duration;

    fn battery(status: BatteryStatus) -> Battery {
        Battery {
            id: 7,
            battery_type_id: 1,
            serial_number: "BAT-0007".into(),
            model: "LFP-48V".into(),
            capacity: 100.0,
            cycle_count: 10,
            health_score: 99.5,
            status,
            vehicle_id: None,
            in_transfer: false,
            estimated_full_charge_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn reserve_only_from_available() {
        let mut b = battery(BatteryStatus::Available);
        b.reserve().unwrap();
        assert_eq!(b.status, BatteryStatus::Reserved);
        assert!(b.reserve().is_err());
    }

    #[test]
    fn attach_increments_cycles_and_rescores() {
        let mut b = battery(BatteryStatus::Reserved);
        b.attach_to_vehicle(42, &LinearHealthScorer { rated_cycles: 100 });
        assert_eq!(b.status, BatteryStatus::InUse);
        assert_eq!(b.vehicle_id, Some(42));
        assert_eq!(b.cycle_count, 11);
        assert!((b.health_score - 89.0).abs() < 1e-9);
        assert!(b.is_consistent());
    }

    #[test]
    fn start_charging_detaches_and_sets_eta() {
        let now = Utc::now();
        let mut b = battery(BatteryStatus::InUse);
        b.vehicle_id = Some(42);
        b.capacity = 20.0;

        b.start_charging(now, Some(2.0)).unwrap();

        assert_eq!(b.status, BatteryStatus::Charging);
        assert_eq!(b.vehicle_id, None);
        assert_eq!(b.estimated_full_charge_at, Some(now + Duration::minutes(96)));
        assert!(b.is_consistent());
    }

    #[test]
    fn bad_charge_rate_leaves_battery_untouched() {
        let mut b = battery(BatteryStatus::InUse);
        b.vehicle_id = Some(42);
        b.capacity = 20.0;

        assert!(b.start_charging(Utc::now(), Some(1e10)).is_err());
        assert_eq!(b.status, BatteryStatus::InUse);
        assert_eq!(b.vehicle_id, Some(42));
        assert!(b.estimated_full_charge_at.is_none());
    }

    #[test]
    fn finish_charging_fills_battery() {
        let mut b = battery(BatteryStatus::Charging);
        b.capacity = 55.0;
        b.estimated_full_charge_at = Some(Utc::now());
        b.finish_charging();
        assert_eq!(b.status, BatteryStatus::Available);
        assert_eq!(b.capacity, 100.0);
        assert!(b.estimated_full_charge_at.is_none());
    }

    #[test]
    fn owned_available_battery_is_inconsistent() {
        let mut b = battery(BatteryStatus::Available);
        b.vehicle_id = Some(1);
        assert!(!b.is_consistent());
    }

    #[test]
    fn transfer_eligibility() {
        assert!(battery(BatteryStatus::Damaged).can_leave_for_transfer());
        assert!(battery(BatteryStatus::Charging).can_leave_for_transfer());
        assert!(!battery(BatteryStatus::Reserved).can_leave_for_transfer());
        assert!(!battery(BatteryStatus::InUse).can_enter_from_transfer());
    }
}
