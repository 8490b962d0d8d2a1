mod common;

use chrono::{Duration, Utc};

use common::{reservation, setup, Station, TestApp, SWAP_PRICE};
use evswap::application::Actor;
use evswap::domain::charging::minutes_to_full;
use evswap::domain::payment::PaymentOutcome;
use evswap::domain::{BatteryStatus, BookingStatus, DomainError, SlotStatus, UserRole};

/// Book `battery_ids`, pay for the booking and check in.
async fn checked_in_booking(app: &TestApp, station: &Station, battery_ids: Vec<i32>) -> i32 {
    let created = app
        .services
        .bookings
        .create_booking(reservation(station, battery_ids))
        .await
        .unwrap();
    let transaction = app
        .services
        .payments
        .get_transaction(
            created.transaction_id.unwrap(),
            Actor::new(station.driver_id, UserRole::Driver),
        )
        .await
        .unwrap();
    app.services
        .payments
        .settle(transaction.order_code, PaymentOutcome::Paid, "", Utc::now())
        .await
        .unwrap();

    let view = app.services.bookings.check_in(created.booking_id).await.unwrap();
    assert_eq!(view.booking.status, BookingStatus::InProgress);
    created.booking_id
}

#[tokio::test]
async fn full_swap_returns_old_battery_and_takes_new_one() {
    let app = setup().await;
    let station = app.seed(3).await;
    let full_slot = station.slots[0].id;
    let empty_slot = station.slots[1].id;
    let fresh = app
        .battery(station.battery_type_id, "BAT-NEW", BatteryStatus::Available, Some(full_slot))
        .await;
    let old = app
        .battery_on_vehicle(station.battery_type_id, "BAT-OLD", station.vehicle_id)
        .await;

    let booking_id = checked_in_booking(&app, &station, vec![fresh.id]).await;

    let before = Utc::now();
    let put = app
        .services
        .bookings
        .put_battery(empty_slot, old.id, booking_id)
        .await
        .unwrap();
    let after = Utc::now();
    // 25% charge on a 2h battery type: 75% of 120 min.
    let charge = Duration::minutes(minutes_to_full(old.capacity, 2.0));
    assert_eq!(charge, Duration::minutes(90));
    let eta = put.estimated_full_charge_at.unwrap();
    assert!(eta >= before + charge && eta <= after + charge);
    let returned = app.reload_battery(old.id).await;
    assert_eq!(returned.status, BatteryStatus::Charging);
    assert_eq!(returned.vehicle_id, None);
    let slot = app.slot(empty_slot).await;
    assert_eq!(slot.status, SlotStatus::Charging);
    assert_eq!(slot.battery_id, Some(old.id));

    let take = app
        .services
        .bookings
        .take_battery(full_slot, booking_id)
        .await
        .unwrap();
    assert_eq!(take.battery_id, fresh.id);
    assert_eq!(take.booking_status, BookingStatus::Completed);

    let taken = app.reload_battery(fresh.id).await;
    assert_eq!(taken.status, BatteryStatus::InUse);
    assert_eq!(taken.vehicle_id, Some(station.vehicle_id));
    assert_eq!(taken.cycle_count, fresh.cycle_count + 1);
    let slot = app.slot(full_slot).await;
    assert_eq!(slot.status, SlotStatus::Empty);
    assert_eq!(slot.battery_id, None);

    let uses = app.services.batteries.usage_history(fresh.id).await.unwrap();
    assert_eq!(uses.len(), 1);
    assert_eq!(uses[0].booking_id, booking_id);

    let history = app.services.stations.slot_history(full_slot).await.unwrap();
    assert!(history
        .iter()
        .any(|h| h.action == "OUT" && h.booking_id == Some(booking_id)));
    let history = app.services.stations.slot_history(empty_slot).await.unwrap();
    assert!(history.iter().any(|h| h.action == "IN" && h.battery_id == old.id));

    let now = Utc::now();
    let report = app
        .services
        .reports
        .summary(now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(report.total_swaps, 1);
    assert_eq!(report.stations.len(), 1);
    assert_eq!(report.stations[0].station_name, "Central");
    assert_eq!(report.revenue, SWAP_PRICE);
}

#[tokio::test]
async fn booking_stays_open_until_every_battery_is_taken() {
    let app = setup().await;
    let station = app.seed(2).await;
    let first = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let second = app
        .battery(
            station.battery_type_id,
            "BAT-2",
            BatteryStatus::Available,
            Some(station.slots[1].id),
        )
        .await;

    let booking_id = checked_in_booking(&app, &station, vec![first.id, second.id]).await;

    let take = app
        .services
        .bookings
        .take_battery(station.slots[0].id, booking_id)
        .await
        .unwrap();
    assert_eq!(take.booking_status, BookingStatus::InProgress);

    let take = app
        .services
        .bookings
        .take_battery(station.slots[1].id, booking_id)
        .await
        .unwrap();
    assert_eq!(take.booking_status, BookingStatus::Completed);
}

#[tokio::test]
async fn swap_requires_check_in() {
    let app = setup().await;
    let station = app.seed(2).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();

    let err = app
        .services
        .bookings
        .take_battery(station.slots[0].id, created.booking_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Reserved);
}

#[tokio::test]
async fn unpaid_booking_cannot_check_in() {
    let app = setup().await;
    let station = app.seed(2).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();

    let err = app.services.bookings.check_in(created.booking_id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn put_rejects_battery_from_another_vehicle() {
    let app = setup().await;
    let station = app.seed(3).await;
    let fresh = app
        .battery(
            station.battery_type_id,
            "BAT-NEW",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let stray = app
        .battery(station.battery_type_id, "BAT-STRAY", BatteryStatus::Available, None)
        .await;
    let booking_id = checked_in_booking(&app, &station, vec![fresh.id]).await;

    let err = app
        .services
        .bookings
        .put_battery(station.slots[1].id, stray.id, booking_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(app.slot(station.slots[1].id).await.status, SlotStatus::Empty);
}

#[tokio::test]
async fn take_from_unreserved_slot_changes_nothing() {
    let app = setup().await;
    let station = app.seed(2).await;
    let booked = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let other = app
        .battery(
            station.battery_type_id,
            "BAT-2",
            BatteryStatus::Available,
            Some(station.slots[1].id),
        )
        .await;
    let booking_id = checked_in_booking(&app, &station, vec![booked.id]).await;

    let err = app
        .services
        .bookings
        .take_battery(station.slots[1].id, booking_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(ref m) if m.contains("not reserved")));

    let slot = app.slot(station.slots[1].id).await;
    assert_eq!(slot.status, SlotStatus::Available);
    assert_eq!(slot.battery_id, Some(other.id));
    let untouched = app.reload_battery(other.id).await;
    assert_eq!(untouched.status, BatteryStatus::Available);
    assert_eq!(untouched.vehicle_id, None);
    assert_eq!(untouched.cycle_count, other.cycle_count);
    assert_eq!(app.reload_battery(booked.id).await.status, BatteryStatus::Reserved);
    assert!(app.services.batteries.usage_history(other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn put_into_occupied_slot_changes_nothing() {
    let app = setup().await;
    let station = app.seed(3).await;
    let fresh = app
        .battery(
            station.battery_type_id,
            "BAT-NEW",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let charging = app
        .battery(
            station.battery_type_id,
            "BAT-CHG",
            BatteryStatus::Charging,
            Some(station.slots[1].id),
        )
        .await;
    let old = app
        .battery_on_vehicle(station.battery_type_id, "BAT-OLD", station.vehicle_id)
        .await;
    let booking_id = checked_in_booking(&app, &station, vec![fresh.id]).await;
    let occupied = station.slots[1].id;
    let status_before = app.slot(occupied).await.status;

    let err = app
        .services
        .bookings
        .put_battery(occupied, old.id, booking_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(ref m) if m.contains("not empty")));

    let slot = app.slot(occupied).await;
    assert_eq!(slot.status, status_before);
    assert_eq!(slot.battery_id, Some(charging.id));
    let still_riding = app.reload_battery(old.id).await;
    assert_eq!(still_riding.status, BatteryStatus::InUse);
    assert_eq!(still_riding.vehicle_id, Some(station.vehicle_id));
    assert!(still_riding.estimated_full_charge_at.is_none());
    let history = app.services.stations.slot_history(occupied).await.unwrap();
    assert!(history.iter().all(|h| h.battery_id != old.id));
}
