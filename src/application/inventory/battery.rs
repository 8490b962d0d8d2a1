//! Battery stock and the charging sweep

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument, warn};

use crate::application::events::SharedEventBus;
use crate::application::workflow::finish;
use crate::domain::charging::{is_valid_charge_rate, MAX_CHARGE_RATE_HOURS};
use crate::domain::events::{BatteryEvent, Event, SlotEvent};
use crate::domain::{
    Battery, BatteryStatus, BatteryType, DomainError, DomainResult, SlotStatus,
};
use crate::infrastructure::database::repositories::battery_repository::{
    BatteryFilter, NewBattery, NewBatteryType,
};
use crate::infrastructure::database::repositories::history_repository::{
    BatteryUse, SlotAction, SlotMovement,
};
use crate::infrastructure::database::Repositories;

/// A new battery, optionally seated straight into an empty slot
#[derive(Debug, Clone)]
pub struct NewBatteryPlacement {
    pub battery: NewBattery,
    pub slot_id: Option<i32>,
}

/// Statuses staff may set by hand. The rest belong to the workflows.
fn check_manual_status(status: BatteryStatus) -> DomainResult<()> {
    match status {
        BatteryStatus::Available | BatteryStatus::Charging | BatteryStatus::Damaged => Ok(()),
        other => Err(DomainError::bad_request(format!(
            "Battery status {} cannot be set directly",
            other
        ))),
    }
}

/// Batteries tied to a booking or a vehicle are off limits to staff edits.
fn check_not_busy(battery: &Battery) -> DomainResult<()> {
    if matches!(
        battery.status,
        BatteryStatus::Reserved | BatteryStatus::InUse | BatteryStatus::Retired
    ) || battery.in_transfer
    {
        return Err(DomainError::bad_request(format!(
            "Battery {} cannot be changed while {}{}",
            battery.id,
            battery.status,
            if battery.in_transfer { " (in transfer)" } else { "" }
        )));
    }
    Ok(())
}

pub struct BatteryService {
    db: DatabaseConnection,
    events: SharedEventBus,
    default_charge_rate_hours: f64,
}

impl BatteryService {
    pub fn new(
        db: DatabaseConnection,
        events: SharedEventBus,
        default_charge_rate_hours: f64,
    ) -> Self {
        Self {
            db,
            events,
            default_charge_rate_hours,
        }
    }

    pub async fn list(&self, filter: BatteryFilter) -> DomainResult<Vec<Battery>> {
        Repositories::new(&self.db).batteries().list(filter).await
    }

    pub async fn get(&self, battery_id: i32) -> DomainResult<Battery> {
        Repositories::new(&self.db).batteries().get(battery_id).await
    }

    pub async fn usage_history(&self, battery_id: i32) -> DomainResult<Vec<BatteryUse>> {
        let repos = Repositories::new(&self.db);
        repos.batteries().get(battery_id).await?;
        repos.histories().battery_uses(battery_id).await
    }

    #[instrument(skip(self, new), fields(serial = %new.battery.serial_number))]
    pub async fn create(&self, new: NewBatteryPlacement) -> DomainResult<Battery> {
        let battery = finish("battery_create", self.provision(new).await)?;
        info!(battery_id = battery.id, status = %battery.status, "Battery created");
        Ok(battery)
    }

    async fn provision(&self, new: NewBatteryPlacement) -> DomainResult<Battery> {
        check_manual_status(new.battery.status)?;
        if !(0.0..=100.0).contains(&new.battery.capacity) {
            return Err(DomainError::bad_request("Capacity must be between 0 and 100"));
        }

        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        repos.batteries().get_type(new.battery.battery_type_id).await?;
        if repos
            .batteries()
            .find_by_serial(&new.battery.serial_number)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Serial number {} is already registered",
                new.battery.serial_number
            )));
        }
        let battery = repos.batteries().insert(new.battery).await?;

        if let Some(slot_id) = new.slot_id {
            let mut slot = repos.slots().lock(slot_id).await?;
            let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
            if !cabinet.accepts(battery.battery_type_id) {
                return Err(DomainError::bad_request(format!(
                    "Cabinet {} does not accept battery type {}",
                    cabinet.id, battery.battery_type_id
                )));
            }
            repos
                .histories()
                .record_slot(slot.id, battery.id, SlotAction::In, SlotMovement::default())
                .await?;
            slot.put_battery(battery.id, battery.status)?;
            repos.slots().save(&slot, SlotStatus::Empty).await?;
        }

        txn.commit().await?;
        Ok(battery)
    }

    /// Set a battery's status by hand and bring its slot along.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        battery_id: i32,
        status: BatteryStatus,
    ) -> DomainResult<Battery> {
        let result = self.apply_status(battery_id, status, Utc::now()).await;
        let (battery, events) = finish("battery_status", result)?;
        info!(battery_id, status = %battery.status, "Battery status updated");
        self.events.publish_all(events);
        Ok(battery)
    }

    async fn apply_status(
        &self,
        battery_id: i32,
        status: BatteryStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<(Battery, Vec<Event>)> {
        check_manual_status(status)?;

        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        check_not_busy(&battery)?;

        let previous = battery.status;
        match status {
            BatteryStatus::Charging => {
                let battery_type = repos.batteries().get_type(battery.battery_type_id).await?;
                let rate = battery_type
                    .charge_rate_hours
                    .unwrap_or(self.default_charge_rate_hours);
                battery.start_charging(now, Some(rate))?;
            }
            other => {
                battery.status = other;
                battery.estimated_full_charge_at = None;
            }
        }
        repos.batteries().save(&battery, previous).await?;

        let mut events = Vec::new();
        if let Some(mut slot) = repos.slots().lock_by_battery(battery.id).await? {
            let slot_previous = slot.status;
            slot.status = SlotStatus::for_battery(battery.status);
            if slot.status != slot_previous {
                repos.slots().save(&slot, slot_previous).await?;
            }
            if slot.status == SlotStatus::Available && slot_previous != SlotStatus::Available {
                let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
                events.push(Event::BatteryAvailable(BatteryEvent {
                    battery_id: battery.id,
                    station_id: cabinet.station_id,
                    booking_id: None,
                }));
                events.push(Event::SlotAvailable(SlotEvent {
                    slot_id: slot.id,
                    station_id: cabinet.station_id,
                    battery_id: Some(battery.id),
                }));
            }
        }

        txn.commit().await?;
        Ok((battery, events))
    }

    /// Take a battery out of service. It leaves its slot and is never
    /// booked again; the row stays for history.
    #[instrument(skip(self))]
    pub async fn retire(&self, battery_id: i32) -> DomainResult<Battery> {
        let battery = finish("battery_retire", self.take_out_of_service(battery_id).await)?;
        info!(battery_id, "Battery retired");
        Ok(battery)
    }

    async fn take_out_of_service(&self, battery_id: i32) -> DomainResult<Battery> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        check_not_busy(&battery)?;

        if let Some(mut slot) = repos.slots().lock_by_battery(battery.id).await? {
            repos
                .histories()
                .record_slot(slot.id, battery.id, SlotAction::Out, SlotMovement::default())
                .await?;
            let slot_previous = slot.status;
            slot.take_battery()?;
            repos.slots().save(&slot, slot_previous).await?;
        }

        let previous = battery.status;
        battery.status = BatteryStatus::Retired;
        battery.estimated_full_charge_at = None;
        repos.batteries().save(&battery, previous).await?;

        txn.commit().await?;
        Ok(battery)
    }

    pub async fn list_types(&self) -> DomainResult<Vec<BatteryType>> {
        Repositories::new(&self.db).batteries().list_types().await
    }

    pub async fn create_type(&self, new: NewBatteryType) -> DomainResult<BatteryType> {
        if new.capacity_kwh <= 0.0 || new.swap_price < 0 {
            return Err(DomainError::bad_request(
                "Capacity must be positive and swap price non-negative",
            ));
        }
        if matches!(new.charge_rate_hours, Some(rate) if !is_valid_charge_rate(rate)) {
            return Err(DomainError::bad_request(format!(
                "Charge rate must be within 0..={} hours",
                MAX_CHARGE_RATE_HOURS
            )));
        }
        let battery_type = Repositories::new(&self.db).batteries().insert_type(new).await?;
        info!(battery_type_id = battery_type.id, name = %battery_type.name, "Battery type created");
        Ok(battery_type)
    }

    /// Flip batteries whose charge estimate has passed to available.
    /// Each battery is handled in its own transaction.
    pub async fn complete_charging(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let due = Repositories::new(&self.db).batteries().due_charging(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        debug!(count = due.len(), "Completing charged batteries");
        let mut completed = 0;
        for battery in due {
            match self.finish_one(battery.id).await {
                Ok(events) => {
                    completed += 1;
                    self.events.publish_all(events);
                }
                Err(DomainError::BadRequest(_)) | Err(DomainError::Conflict(_)) => {}
                Err(e) => warn!(battery_id = battery.id, error = %e, "Failed to complete charging"),
            }
        }
        if completed > 0 {
            info!(completed, "Batteries charged");
        }
        Ok(completed)
    }

    async fn finish_one(&self, battery_id: i32) -> DomainResult<Vec<Event>> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut battery = repos
            .batteries()
            .lock_with_status(battery_id, BatteryStatus::Charging)
            .await?
            .ok_or_else(|| {
                DomainError::bad_request(format!("Battery {} is no longer charging", battery_id))
            })?;
        battery.finish_charging();
        repos.batteries().save(&battery, BatteryStatus::Charging).await?;

        let mut events = Vec::new();
        if let Some(mut slot) = repos
            .slots()
            .lock_by_battery_with_status(battery.id, SlotStatus::Charging)
            .await?
        {
            slot.status = SlotStatus::Available;
            repos.slots().save(&slot, SlotStatus::Charging).await?;

            let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
            events.push(Event::BatteryAvailable(BatteryEvent {
                battery_id: battery.id,
                station_id: cabinet.station_id,
                booking_id: None,
            }));
            events.push(Event::SlotAvailable(SlotEvent {
                slot_id: slot.id,
                station_id: cabinet.station_id,
                battery_id: Some(battery.id),
            }));
        }

        txn.commit().await?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_statuses_cannot_be_set_by_hand() {
        assert!(check_manual_status(BatteryStatus::Damaged).is_ok());
        assert!(check_manual_status(BatteryStatus::Reserved).is_err());
        assert!(check_manual_status(BatteryStatus::InUse).is_err());
        assert!(check_manual_status(BatteryStatus::Retired).is_err());
    }
}
