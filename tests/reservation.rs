mod common;

use chrono::{Duration, Utc};

use common::{reservation, setup, SWAP_PRICE};
use evswap::application::inventory::StationUpdate;
use evswap::domain::{BatteryStatus, BookingStatus, DomainError, SlotStatus};
use evswap::infrastructure::database::repositories::Page;

#[tokio::test]
async fn booking_reserves_battery_and_its_slot() {
    let app = setup().await;
    let station = app.seed(4).await;
    let slot_id = station.slots[2].id;
    let battery = app
        .battery(station.battery_type_id, "BAT-7", BatteryStatus::Available, Some(slot_id))
        .await;

    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();

    assert_eq!(created.status, BookingStatus::Pending);
    assert_eq!(created.total_price, SWAP_PRICE);
    assert!(created.user_membership_id.is_none());
    assert!(created.transaction_id.is_some());
    assert!(created.checkout_url.unwrap().starts_with("https://pay.test/"));
    assert!(created.expected_pickup_time > Utc::now());

    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Reserved);
    let slot = app.slot(slot_id).await;
    assert_eq!(slot.status, SlotStatus::Reserved);
    assert_eq!(slot.battery_id, Some(battery.id));
}

#[tokio::test]
async fn failed_reservation_leaves_nothing_behind() {
    let app = setup().await;
    let station = app.seed(4).await;
    let ready = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let damaged = app
        .battery(
            station.battery_type_id,
            "BAT-2",
            BatteryStatus::Damaged,
            Some(station.slots[1].id),
        )
        .await;

    let err = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![ready.id, damaged.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    assert_eq!(app.reload_battery(ready.id).await.status, BatteryStatus::Available);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Available);
    let (bookings, total) = app
        .services
        .bookings
        .list_user_bookings(station.driver_id, Page::default())
        .await
        .unwrap();
    assert!(bookings.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn battery_cannot_be_reserved_twice() {
    let app = setup().await;
    let station = app.seed(2).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-7",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;

    app.services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();
    let err = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn duplicate_battery_ids_are_rejected() {
    let app = setup().await;
    let station = app.seed(2).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-7",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;

    let err = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id, battery.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Available);
}

#[tokio::test]
async fn someone_elses_vehicle_cannot_be_booked() {
    let app = setup().await;
    let station = app.seed(2).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-7",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;
    let stranger = app
        .insert_user("stranger@evswap.test", evswap::domain::UserRole::Driver)
        .await;

    let mut request = reservation(&station, vec![battery.id]);
    request.user_id = stranger;
    let err = app.services.bookings.create_booking(request).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Available);
}

#[tokio::test]
async fn membership_pays_for_swaps_and_never_goes_negative() {
    let app = setup().await;
    let station = app.seed(4).await;
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

    let membership = app.active_membership(station.driver_id, 1).await;

    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![first.id]))
        .await
        .unwrap();
    assert_eq!(created.user_membership_id, Some(membership.id));
    assert!(created.transaction_id.is_none());

    assert_eq!(app.membership(station.driver_id).await.remaining_swaps, 0);

    let err = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![second.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(app.membership(station.driver_id).await.remaining_swaps, 0);
    assert_eq!(app.reload_battery(second.id).await.status, BatteryStatus::Available);
}

#[tokio::test]
async fn pickup_outside_opening_hours_is_refused() {
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

    // Stations keep local time at UTC+7. The window opens hours after the
    // driver would arrive.
    let local_now = (Utc::now() + Duration::hours(7)).time();
    let open = local_now + Duration::hours(6);
    let close = local_now + Duration::hours(7);
    app.services
        .stations
        .update(
            station.station_id,
            StationUpdate {
                open_time: Some(open.format("%H:%M:%S").to_string()),
                close_time: Some(close.format("%H:%M:%S").to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(ref m) if m.contains("opening hours")));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Available);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Available);
}
