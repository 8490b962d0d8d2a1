//! Check-in, cancellation, expiry and booking queries

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{info, instrument, warn};

use super::BookingService;
use crate::application::actor::Actor;
use crate::application::workflow::finish;
use crate::domain::events::{BatteryEvent, BookingStatusChangedEvent, Event, SlotEvent};
use crate::domain::{
    BatteryStatus, Booking, BookingDetail, BookingDetailStatus, BookingStatus, DomainError,
    DomainResult, SlotStatus, TransactionStatus,
};
use crate::infrastructure::database::repositories::Page;
use crate::infrastructure::database::Repositories;

/// A booking with its line items
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub details: Vec<BookingDetail>,
}

impl BookingView {
    pub fn total_price(&self) -> i64 {
        self.details.iter().map(|d| d.price).sum()
    }
}

/// Cancel or expire an open booking and give back everything it held:
/// reserved batteries and slots, membership swaps and the unpaid
/// transaction. Returns the events to publish once committed.
pub(crate) async fn close_booking<C: ConnectionTrait>(
    repos: &Repositories<'_, C>,
    booking: &mut Booking,
    outcome: BookingStatus,
) -> DomainResult<Vec<Event>> {
    let previous = booking.status;
    booking.close(outcome)?;
    repos.bookings().save(booking, previous).await?;

    let detail_outcome = match outcome {
        BookingStatus::Expired => BookingDetailStatus::Expired,
        _ => BookingDetailStatus::Cancelled,
    };

    let mut events = Vec::new();
    let mut released = 0;

    for mut detail in repos.bookings().details(booking.id).await? {
        if !detail.status.is_open() {
            continue;
        }
        let detail_previous = detail.status;
        detail.status = detail_outcome;
        repos.bookings().save_detail(&detail, detail_previous).await?;
        released += 1;

        if let Some(mut battery) = repos.batteries().lock(detail.battery_id).await? {
            if battery.status == BatteryStatus::Reserved {
                battery.release();
                repos.batteries().save(&battery, BatteryStatus::Reserved).await?;
                events.push(Event::BatteryAvailable(BatteryEvent {
                    battery_id: battery.id,
                    station_id: booking.station_id,
                    booking_id: Some(booking.id),
                }));
            }
        }

        if let Some(mut slot) = repos
            .slots()
            .lock_by_battery_with_status(detail.battery_id, SlotStatus::Reserved)
            .await?
        {
            slot.release();
            repos.slots().save(&slot, SlotStatus::Reserved).await?;
            events.push(Event::SlotAvailable(SlotEvent {
                slot_id: slot.id,
                station_id: booking.station_id,
                battery_id: slot.battery_id,
            }));
        }
    }

    if let Some(membership_id) = booking.user_membership_id {
        if released > 0 {
            if let Some(read) = repos.memberships().lock(membership_id).await? {
                let mut membership = read.clone();
                membership.restore(released);
                repos.memberships().save(&membership, &read).await?;
            }
        }
    }

    if let Some(transaction_id) = booking.transaction_id {
        let mut transaction = repos.payments().get(transaction_id).await?;
        if transaction.is_pending() {
            transaction.status = TransactionStatus::Cancelled;
            repos
                .payments()
                .save_status(&transaction, TransactionStatus::Pending)
                .await?;
        }
    }

    events.push(Event::BookingStatusChanged(BookingStatusChangedEvent {
        booking_id: booking.id,
        station_id: booking.station_id,
        status: booking.status.to_string(),
    }));
    Ok(events)
}

impl BookingService {
    /// Staff confirms the driver is at the station; swaps may start.
    #[instrument(skip(self))]
    pub async fn check_in(&self, booking_id: i32) -> DomainResult<BookingView> {
        let view = finish("check_in", self.start(booking_id).await)?;
        info!(booking_id, "Booking checked in");
        self.events.publish(Event::BookingStatusChanged(BookingStatusChangedEvent {
            booking_id,
            station_id: view.booking.station_id,
            status: view.booking.status.to_string(),
        }));
        Ok(view)
    }

    async fn start(&self, booking_id: i32) -> DomainResult<BookingView> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut booking = repos.bookings().lock(booking_id).await?;
        let previous = booking.status;
        booking.check_in()?;
        repos.bookings().save(&booking, previous).await?;

        let mut details = repos.bookings().details(booking.id).await?;
        for detail in details.iter_mut().filter(|d| d.status.is_open()) {
            let detail_previous = detail.status;
            detail.status = BookingDetailStatus::InProgress;
            repos.bookings().save_detail(detail, detail_previous).await?;
        }

        txn.commit().await?;
        Ok(BookingView { booking, details })
    }

    /// Cancel a booking that has not started. Owner or staff only.
    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, booking_id: i32, actor: Actor) -> DomainResult<BookingView> {
        let result = self.close(booking_id, Some(actor), BookingStatus::Cancelled).await;
        let (view, events) = finish("cancel_booking", result)?;
        info!(booking_id, "Booking cancelled");
        self.events.publish_all(events);
        Ok(view)
    }

    async fn close(
        &self,
        booking_id: i32,
        actor: Option<Actor>,
        outcome: BookingStatus,
    ) -> DomainResult<(BookingView, Vec<Event>)> {
        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        let mut booking = repos.bookings().lock(booking_id).await?;
        if let Some(actor) = actor {
            actor.require_owner_or_staff(booking.user_id)?;
        }
        let events = close_booking(&repos, &mut booking, outcome).await?;
        let details = repos.bookings().details(booking.id).await?;

        txn.commit().await?;
        Ok((BookingView { booking, details }, events))
    }

    /// Expire open bookings whose pickup time plus grace has passed.
    /// Each booking is released in its own transaction.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let cutoff = now - Duration::minutes(self.policy.grace_minutes);
        let overdue = Repositories::new(&self.db)
            .bookings()
            .overdue_open(cutoff)
            .await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        info!(count = overdue.len(), "Expiring overdue bookings");
        let mut expired = 0;
        for booking in overdue {
            match self.close(booking.id, None, BookingStatus::Expired).await {
                Ok((_, events)) => {
                    expired += 1;
                    self.events.publish_all(events);
                }
                // Checked in or cancelled since the scan
                Err(DomainError::BadRequest(_)) | Err(DomainError::Conflict(_)) => {}
                Err(e) => warn!(booking_id = booking.id, error = %e, "Failed to expire booking"),
            }
        }
        Ok(expired)
    }

    pub async fn get_booking(&self, booking_id: i32, actor: Actor) -> DomainResult<BookingView> {
        let repos = Repositories::new(&self.db);
        let booking = repos.bookings().get(booking_id).await?;
        if booking.user_id != actor.user_id && !actor.is_staff() {
            // Hide other drivers' bookings.
            return Err(DomainError::not_found("Booking", booking_id));
        }
        let details = repos.bookings().details(booking.id).await?;
        Ok(BookingView { booking, details })
    }

    pub async fn list_user_bookings(
        &self,
        user_id: i32,
        page: Page,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        Repositories::new(&self.db)
            .bookings()
            .list_by_user(user_id, page)
            .await
    }

    pub async fn list_station_bookings(
        &self,
        station_id: i32,
        status: Option<BookingStatus>,
        page: Page,
    ) -> DomainResult<(Vec<Booking>, u64)> {
        let repos = Repositories::new(&self.db);
        repos.stations().get(station_id).await?;
        repos.bookings().list_by_station(station_id, status, page).await
    }
}
