mod common;

use chrono::{Duration, Utc};

use common::{reservation, setup};
use evswap::application::Actor;
use evswap::domain::{
    BatteryStatus, BookingDetailStatus, BookingStatus, DomainError, MembershipStatus, SlotStatus,
    TransactionStatus, UserRole,
};

#[tokio::test]
async fn cancel_releases_batteries_slots_and_payment() {
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
    let driver = Actor::new(station.driver_id, UserRole::Driver);

    let view = app
        .services
        .bookings
        .cancel_booking(created.booking_id, driver)
        .await
        .unwrap();
    assert_eq!(view.booking.status, BookingStatus::Cancelled);
    assert!(view
        .details
        .iter()
        .all(|d| d.status == BookingDetailStatus::Cancelled));

    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Available);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Available);
    let transaction = app
        .services
        .payments
        .get_transaction(created.transaction_id.unwrap(), driver)
        .await
        .unwrap();
    assert_eq!(transaction.status, TransactionStatus::Cancelled);

    // The battery can be booked again.
    app.services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();
}

#[tokio::test]
async fn cancel_gives_membership_swaps_back() {
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
    app.active_membership(station.driver_id, 3).await;

    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![first.id, second.id]))
        .await
        .unwrap();
    assert_eq!(app.membership(station.driver_id).await.remaining_swaps, 1);

    app.services
        .bookings
        .cancel_booking(created.booking_id, Actor::new(station.driver_id, UserRole::Driver))
        .await
        .unwrap();
    let membership = app.membership(station.driver_id).await;
    assert_eq!(membership.remaining_swaps, 3);
    assert_eq!(membership.status, MembershipStatus::Active);
}

#[tokio::test]
async fn membership_booking_checks_in_without_payment() {
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
    app.active_membership(station.driver_id, 2).await;

    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();
    assert_eq!(created.status, BookingStatus::Pending);

    let view = app.services.bookings.check_in(created.booking_id).await.unwrap();
    assert_eq!(view.booking.status, BookingStatus::InProgress);
    assert!(view
        .details
        .iter()
        .all(|d| d.status == BookingDetailStatus::InProgress));
}

#[tokio::test]
async fn only_owner_or_staff_may_cancel() {
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
    let stranger = app.insert_user("stranger@evswap.test", UserRole::Driver).await;

    let err = app
        .services
        .bookings
        .cancel_booking(created.booking_id, Actor::new(stranger, UserRole::Driver))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Reserved);

    let staff = app.insert_user("staff@evswap.test", UserRole::Staff).await;
    let view = app
        .services
        .bookings
        .cancel_booking(created.booking_id, Actor::new(staff, UserRole::Staff))
        .await
        .unwrap();
    assert_eq!(view.booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn checked_in_booking_cannot_be_cancelled() {
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
    app.active_membership(station.driver_id, 1).await;
    let created = app
        .services
        .bookings
        .create_booking(reservation(&station, vec![battery.id]))
        .await
        .unwrap();
    app.services.bookings.check_in(created.booking_id).await.unwrap();

    let err = app
        .services
        .bookings
        .cancel_booking(created.booking_id, Actor::new(station.driver_id, UserRole::Driver))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn overdue_bookings_expire_and_release() {
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

    // Still inside the grace window.
    let expired = app.services.bookings.expire_overdue(Utc::now()).await.unwrap();
    assert_eq!(expired, 0);

    let later = created.expected_pickup_time + Duration::hours(2);
    let expired = app.services.bookings.expire_overdue(later).await.unwrap();
    assert_eq!(expired, 1);

    let view = app
        .services
        .bookings
        .get_booking(created.booking_id, Actor::new(station.driver_id, UserRole::Driver))
        .await
        .unwrap();
    assert_eq!(view.booking.status, BookingStatus::Expired);
    assert!(view.details.iter().all(|d| d.status == BookingDetailStatus::Expired));
    assert_eq!(app.reload_battery(battery.id).await.status, BatteryStatus::Available);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Available);

    // Nothing left to expire.
    let expired = app.services.bookings.expire_overdue(later).await.unwrap();
    assert_eq!(expired, 0);
}

#[tokio::test]
async fn other_drivers_bookings_are_hidden() {
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
    let stranger = app.insert_user("stranger@evswap.test", UserRole::Driver).await;

    let err = app
        .services
        .bookings
        .get_booking(created.booking_id, Actor::new(stranger, UserRole::Driver))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}
