//! Swap execution for a checked-in booking
//!
//! `take` moves a reserved battery from its slot onto the driver's vehicle,
//! `put` moves the driver's depleted battery into an empty slot to charge.

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::TransactionTrait;
use tracing::{info, instrument};

use super::BookingService;
use crate::application::workflow::finish;
use crate::domain::events::{BookingStatusChangedEvent, Event};
use crate::domain::{
    BatteryStatus, BookingDetailStatus, BookingStatus, DomainError, DomainResult, SlotStatus,
};
use crate::infrastructure::database::repositories::history_repository::{
    BatteryUse, SlotAction, SlotMovement,
};
use crate::infrastructure::database::Repositories;

#[derive(Debug, Clone)]
pub struct TakeOutcome {
    pub booking_id: i32,
    pub station_id: i32,
    pub slot_id: i32,
    pub battery_id: i32,
    pub booking_status: BookingStatus,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct PutOutcome {
    pub booking_id: i32,
    pub slot_id: i32,
    pub battery_id: i32,
    pub estimated_full_charge_at: Option<DateTime<Utc>>,
    pub message: String,
}

impl BookingService {
    /// Driver takes the reserved battery out of `slot_id`.
    #[instrument(skip(self))]
    pub async fn take_battery(&self, slot_id: i32, booking_id: i32) -> DomainResult<TakeOutcome> {
        let outcome = finish("swap_take", self.take(slot_id, booking_id).await)?;
        counter!("swaps_total", "kind" => "take").increment(1);
        info!(
            booking_id,
            slot_id,
            battery_id = outcome.battery_id,
            booking_status = %outcome.booking_status,
            "Battery taken"
        );
        if outcome.booking_status == BookingStatus::Completed {
            self.events.publish(Event::BookingStatusChanged(BookingStatusChangedEvent {
                booking_id,
                station_id: outcome.station_id,
                status: outcome.booking_status.to_string(),
            }));
        }
        Ok(outcome)
    }

    async fn take(&self, slot_id: i32, booking_id: i32) -> DomainResult<TakeOutcome> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut booking = repos.bookings().lock(booking_id).await?;
        booking.require_in_progress()?;

        let mut slot = repos.slots().lock(slot_id).await?;
        if slot.status != SlotStatus::Reserved {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not reserved (status: {})",
                slot.id, slot.status
            )));
        }
        let battery_id = slot.battery_id.ok_or_else(|| {
            DomainError::bad_request(format!("Slot {} holds no battery", slot.id))
        })?;

        let mut details = repos.bookings().details(booking.id).await?;
        let index = details
            .iter()
            .position(|d| d.battery_id == battery_id && d.status == BookingDetailStatus::InProgress)
            .ok_or_else(|| {
                DomainError::bad_request(format!(
                    "Battery {} is not part of booking {}",
                    battery_id, booking.id
                ))
            })?;

        let vehicle = repos.vehicles().get(booking.vehicle_id).await?;
        let vehicle_type = repos.vehicles().get_type(vehicle.vehicle_type_id).await?;
        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        if battery.status != BatteryStatus::Reserved {
            return Err(DomainError::bad_request(format!(
                "Battery {} is not reserved (status: {})",
                battery.id, battery.status
            )));
        }
        vehicle_type.require_battery_type(battery.battery_type_id)?;

        repos
            .histories()
            .record_slot(
                slot.id,
                battery.id,
                SlotAction::Out,
                SlotMovement {
                    booking_id: Some(booking.id),
                    ..Default::default()
                },
            )
            .await?;
        slot.take_battery()?;
        repos.slots().save(&slot, SlotStatus::Reserved).await?;

        battery.attach_to_vehicle(vehicle.id, self.scorer.as_ref());
        repos.batteries().save(&battery, BatteryStatus::Reserved).await?;

        let detail = &mut details[index];
        repos
            .histories()
            .record_battery_use(BatteryUse {
                battery_id: battery.id,
                vehicle_id: vehicle.id,
                booking_id: booking.id,
                cycle_count: battery.cycle_count,
                capacity: battery.capacity,
                health_score: battery.health_score,
                price: detail.price,
            })
            .await?;

        detail.status = BookingDetailStatus::Completed;
        repos
            .bookings()
            .save_detail(detail, BookingDetailStatus::InProgress)
            .await?;

        booking.settle(&details);
        if booking.status != BookingStatus::InProgress {
            repos.bookings().save(&booking, BookingStatus::InProgress).await?;
        }

        txn.commit().await?;

        Ok(TakeOutcome {
            booking_id: booking.id,
            station_id: booking.station_id,
            slot_id: slot.id,
            battery_id: battery.id,
            booking_status: booking.status,
            message: format!("Battery {} taken from slot {}", battery.id, slot.id),
        })
    }

    /// Driver returns a battery from their vehicle into empty `slot_id`.
    #[instrument(skip(self))]
    pub async fn put_battery(
        &self,
        slot_id: i32,
        battery_id: i32,
        booking_id: i32,
    ) -> DomainResult<PutOutcome> {
        let result = self.put(slot_id, battery_id, booking_id, Utc::now()).await;
        let outcome = finish("swap_put", result)?;
        counter!("swaps_total", "kind" => "put").increment(1);
        info!(booking_id, slot_id, battery_id, "Battery returned");
        Ok(outcome)
    }

    async fn put(
        &self,
        slot_id: i32,
        battery_id: i32,
        booking_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<PutOutcome> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let booking = repos.bookings().lock(booking_id).await?;
        booking.require_in_progress()?;

        let mut slot = repos.slots().lock(slot_id).await?;
        if slot.status != SlotStatus::Empty || slot.battery_id.is_some() {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not empty (status: {})",
                slot.id, slot.status
            )));
        }
        let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
        if cabinet.station_id != booking.station_id {
            return Err(DomainError::bad_request(format!(
                "Slot {} is not at station {}",
                slot.id, booking.station_id
            )));
        }

        let mut battery = repos
            .batteries()
            .lock(battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", battery_id))?;
        if battery.status != BatteryStatus::InUse
            || battery.vehicle_id != Some(booking.vehicle_id)
        {
            return Err(DomainError::bad_request(format!(
                "Battery {} is not in use by vehicle {}",
                battery.id, booking.vehicle_id
            )));
        }
        if !cabinet.accepts(battery.battery_type_id) {
            return Err(DomainError::bad_request(format!(
                "Cabinet {} does not accept battery type {}",
                cabinet.id, battery.battery_type_id
            )));
        }
        let battery_type = repos.batteries().get_type(battery.battery_type_id).await?;
        let rate = battery_type
            .charge_rate_hours
            .or(Some(self.policy.default_charge_rate_hours));

        battery.start_charging(now, rate)?;
        repos.batteries().save(&battery, BatteryStatus::InUse).await?;

        repos
            .histories()
            .record_slot(
                slot.id,
                battery.id,
                SlotAction::In,
                SlotMovement {
                    booking_id: Some(booking.id),
                    ..Default::default()
                },
            )
            .await?;
        slot.put_battery(battery.id, battery.status)?;
        repos.slots().save(&slot, SlotStatus::Empty).await?;

        txn.commit().await?;

        Ok(PutOutcome {
            booking_id: booking.id,
            slot_id: slot.id,
            battery_id: battery.id,
            estimated_full_charge_at: battery.estimated_full_charge_at,
            message: format!("Battery {} is charging in slot {}", battery.id, slot.id),
        })
    }
}
