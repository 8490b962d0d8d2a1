//! Booking creation
//!
//! Everything from the vehicle check to the last reserved slot runs in one
//! database transaction. A single unavailable battery rolls back the whole
//! booking, including the membership swaps already taken.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::TransactionTrait;
use tracing::{info, instrument};

use super::BookingService;
use crate::application::workflow::finish;
use crate::domain::events::{BatteryEvent, BookingStatusChangedEvent, Event, SlotEvent};
use crate::domain::geo::calc_distance;
use crate::domain::{
    BatteryStatus, BookingStatus, DomainError, DomainResult, SlotStatus, TransactionKind,
};
use crate::infrastructure::database::repositories::booking_repository::NewBooking;
use crate::infrastructure::database::Repositories;

#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub user_id: i32,
    pub vehicle_id: i32,
    pub station_id: i32,
    pub battery_ids: Vec<i32>,
    pub user_lat: f64,
    pub user_lng: f64,
}

#[derive(Debug, Clone)]
pub struct BookingCreated {
    pub booking_id: i32,
    pub status: BookingStatus,
    pub expected_pickup_time: DateTime<Utc>,
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub total_price: i64,
    pub user_membership_id: Option<i32>,
    pub transaction_id: Option<i32>,
    pub checkout_url: Option<String>,
}

fn check_battery_list(ids: &[i32]) -> DomainResult<()> {
    if ids.is_empty() {
        return Err(DomainError::bad_request("At least one battery must be requested"));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(DomainError::bad_request(format!(
            "Battery {} is requested more than once",
            dup
        )));
    }
    Ok(())
}

impl BookingService {
    /// Reserve batteries at a station for a driver on their way.
    #[instrument(skip(self, request), fields(user_id = request.user_id, station_id = request.station_id))]
    pub async fn create_booking(
        &self,
        request: ReservationRequest,
    ) -> DomainResult<BookingCreated> {
        let result = self.reserve(request, Utc::now()).await;
        let mut created = finish("reservation", result)?;

        counter!("bookings_created_total").increment(1);
        info!(
            booking_id = created.booking_id,
            total_price = created.total_price,
            "Booking created"
        );

        if let Some(transaction_id) = created.transaction_id {
            created.checkout_url = self
                .payments
                .request_link(transaction_id, &format!("EVSWAP {}", created.booking_id))
                .await;
        }
        Ok(created)
    }

    async fn reserve(
        &self,
        request: ReservationRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<BookingCreated> {
        check_battery_list(&request.battery_ids)?;

        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let vehicle = repos
            .vehicles()
            .find(request.vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", request.vehicle_id))?;
        vehicle.require_owner(request.user_id)?;
        let vehicle_type = repos.vehicles().get_type(vehicle.vehicle_type_id).await?;

        let station = repos.stations().get(request.station_id).await?;
        if !station.is_active() {
            return Err(DomainError::bad_request(format!(
                "Station {} is not accepting bookings (status: {})",
                station.id, station.status
            )));
        }

        // Swaps come off the membership quota before anything is reserved.
        let count = request.battery_ids.len() as i32;
        let membership = match repos.memberships().lock_usable(request.user_id, now).await? {
            Some(read) => {
                let mut membership = read.clone();
                membership.consume(count)?;
                repos.memberships().save(&membership, &read).await?;
                Some(membership)
            }
            None => None,
        };

        let distance = calc_distance(
            request.user_lat,
            request.user_lng,
            station.latitude,
            station.longitude,
        );
        let estimate = self.policy.travel.estimate(distance, now);
        if let Some(hours) = station.opening_hours()? {
            if !hours.contains(estimate.expected_pickup_time, self.policy.station_offset) {
                return Err(DomainError::bad_request(format!(
                    "Expected pickup at {} is outside the opening hours of station {}",
                    estimate
                        .expected_pickup_time
                        .with_timezone(&self.policy.station_offset)
                        .format("%H:%M"),
                    station.id
                )));
            }
        }

        let mut booking = repos
            .bookings()
            .insert(NewBooking {
                user_id: request.user_id,
                vehicle_id: vehicle.id,
                station_id: station.id,
                user_membership_id: membership.as_ref().map(|m| m.id),
                expected_pickup_time: estimate.expected_pickup_time,
                distance_km: estimate.distance_km,
                travel_minutes: estimate.travel_minutes,
            })
            .await?;

        let mut events = Vec::with_capacity(request.battery_ids.len() * 2 + 1);
        let mut total_price = 0;

        for &battery_id in &request.battery_ids {
            let mut battery = repos
                .batteries()
                .lock_with_status(battery_id, BatteryStatus::Available)
                .await?
                .ok_or_else(|| {
                    DomainError::bad_request(format!("Battery {} is not available", battery_id))
                })?;
            let mut slot = repos
                .slots()
                .lock_by_battery_with_status(battery_id, SlotStatus::Available)
                .await?
                .ok_or_else(|| {
                    DomainError::bad_request(format!(
                        "Battery {} is not in an available slot",
                        battery_id
                    ))
                })?;

            let cabinet = repos.stations().get_cabinet(slot.cabinet_id).await?;
            if cabinet.station_id != station.id {
                return Err(DomainError::bad_request(format!(
                    "Battery {} is not at station {}",
                    battery_id, station.id
                )));
            }
            vehicle_type.require_battery_type(battery.battery_type_id)?;
            let battery_type = repos.batteries().get_type(battery.battery_type_id).await?;

            battery.reserve()?;
            repos.batteries().save(&battery, BatteryStatus::Available).await?;
            slot.reserve()?;
            repos.slots().save(&slot, SlotStatus::Available).await?;

            repos
                .bookings()
                .insert_detail(booking.id, battery.id, battery_type.swap_price)
                .await?;
            total_price += battery_type.swap_price;

            events.push(Event::BatteryReserved(BatteryEvent {
                battery_id: battery.id,
                station_id: station.id,
                booking_id: Some(booking.id),
            }));
            events.push(Event::SlotReserved(SlotEvent {
                slot_id: slot.id,
                station_id: station.id,
                battery_id: Some(battery.id),
            }));
        }

        // Without a membership the driver pays per booking.
        if membership.is_none() {
            let transaction = repos
                .payments()
                .insert_pending(request.user_id, total_price, TransactionKind::Booking)
                .await?;
            booking.transaction_id = Some(transaction.id);
            repos.bookings().save(&booking, BookingStatus::Pending).await?;
        }

        txn.commit().await?;

        events.push(Event::BookingStatusChanged(BookingStatusChangedEvent {
            booking_id: booking.id,
            station_id: station.id,
            status: booking.status.to_string(),
        }));
        self.events.publish_all(events);

        Ok(BookingCreated {
            booking_id: booking.id,
            status: booking.status,
            expected_pickup_time: booking.expected_pickup_time,
            distance_km: booking.distance_km,
            travel_minutes: booking.travel_minutes,
            total_price,
            user_membership_id: booking.user_membership_id,
            transaction_id: booking.transaction_id,
            checkout_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_list_must_be_non_empty_and_distinct() {
        assert!(check_battery_list(&[]).is_err());
        assert!(check_battery_list(&[1, 2, 1]).is_err());
        assert!(check_battery_list(&[1, 2, 3]).is_ok());
    }
}
