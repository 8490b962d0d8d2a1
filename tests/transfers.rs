mod common;

use common::setup;
use evswap::application::transfer::TransferOrder;
use evswap::domain::{BatteryStatus, DomainError, SlotStatus, TransferStatus, UserRole};

#[tokio::test]
async fn batteries_move_between_stations() {
    let app = setup().await;
    let central = app.seed(2).await;
    let (north_id, _, north_slots) = app.station("North", central.battery_type_id, 2).await;
    let staff = app.insert_user("staff@evswap.test", UserRole::Staff).await;
    let first = app
        .battery(
            central.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(central.slots[0].id),
        )
        .await;
    let second = app
        .battery(
            central.battery_type_id,
            "BAT-2",
            BatteryStatus::Damaged,
            Some(central.slots[1].id),
        )
        .await;

    let view = app
        .services
        .transfers
        .create_request(
            TransferOrder {
                from_station_id: central.station_id,
                to_station_id: north_id,
                battery_ids: vec![first.id, second.id],
                note: Some("rebalance".to_string()),
            },
            staff,
        )
        .await
        .unwrap();
    let request_id = view.request.id;
    assert_eq!(view.request.status, TransferStatus::Pending);
    assert_eq!(view.details.len(), 2);

    let moved = app
        .services
        .transfers
        .take_battery(central.slots[0].id)
        .await
        .unwrap();
    assert_eq!(moved.battery_id, first.id);
    assert_eq!(moved.request.unwrap().status, TransferStatus::Transferring);
    assert!(app.reload_battery(first.id).await.in_transfer);
    assert_eq!(app.slot(central.slots[0].id).await.status, SlotStatus::Empty);

    // Back into the source station is the wrong destination.
    let err = app
        .services
        .transfers
        .put_battery(central.slots[0].id, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    let placed = app
        .services
        .transfers
        .put_battery(north_slots[0].id, first.id)
        .await
        .unwrap();
    assert_eq!(placed.slot_status, SlotStatus::Available);
    assert_eq!(placed.request.unwrap().status, TransferStatus::Transferring);
    assert!(!app.reload_battery(first.id).await.in_transfer);

    app.services
        .transfers
        .take_battery(central.slots[1].id)
        .await
        .unwrap();
    let placed = app
        .services
        .transfers
        .put_battery(north_slots[1].id, second.id)
        .await
        .unwrap();
    assert_eq!(placed.slot_status, SlotStatus::DamagedBattery);

    let view = app.services.transfers.get_request(request_id).await.unwrap();
    assert_eq!(view.request.status, TransferStatus::Completed);
    assert!(view.details.iter().all(|d| d.status == TransferStatus::Completed));

    let history = app.services.stations.slot_history(north_slots[0].id).await.unwrap();
    assert!(history
        .iter()
        .any(|h| h.action == "IN" && h.transfer_request_id == Some(request_id)));
}

#[tokio::test]
async fn battery_in_transit_cannot_be_booked() {
    let app = setup().await;
    let central = app.seed(2).await;
    let (north_id, _, _) = app.station("North", central.battery_type_id, 1).await;
    let staff = app.insert_user("staff@evswap.test", UserRole::Staff).await;
    let battery = app
        .battery(
            central.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(central.slots[0].id),
        )
        .await;

    app.services
        .transfers
        .create_request(
            TransferOrder {
                from_station_id: central.station_id,
                to_station_id: north_id,
                battery_ids: vec![battery.id],
                note: None,
            },
            staff,
        )
        .await
        .unwrap();
    app.services
        .transfers
        .take_battery(central.slots[0].id)
        .await
        .unwrap();

    let err = app
        .services
        .bookings
        .create_booking(common::reservation(&central, vec![battery.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn request_must_come_from_the_source_station() {
    let app = setup().await;
    let central = app.seed(1).await;
    let (north_id, _, north_slots) = app.station("North", central.battery_type_id, 1).await;
    let staff = app.insert_user("staff@evswap.test", UserRole::Staff).await;
    let battery = app
        .battery(
            central.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(north_slots[0].id),
        )
        .await;

    let order = |battery_ids: Vec<i32>, to_station_id: i32| TransferOrder {
        from_station_id: central.station_id,
        to_station_id,
        battery_ids,
        note: None,
    };

    let err = app
        .services
        .transfers
        .create_request(order(vec![battery.id], north_id), staff)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    let err = app
        .services
        .transfers
        .create_request(order(vec![battery.id], central.station_id), staff)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn only_untouched_requests_can_be_cancelled() {
    let app = setup().await;
    let central = app.seed(2).await;
    let (north_id, _, _) = app.station("North", central.battery_type_id, 2).await;
    let staff = app.insert_user("staff@evswap.test", UserRole::Staff).await;
    let first = app
        .battery(
            central.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(central.slots[0].id),
        )
        .await;
    let second = app
        .battery(
            central.battery_type_id,
            "BAT-2",
            BatteryStatus::Available,
            Some(central.slots[1].id),
        )
        .await;
    let order = |battery_id: i32| TransferOrder {
        from_station_id: central.station_id,
        to_station_id: north_id,
        battery_ids: vec![battery_id],
        note: None,
    };

    let pending = app
        .services
        .transfers
        .create_request(order(first.id), staff)
        .await
        .unwrap();
    let view = app
        .services
        .transfers
        .cancel_request(pending.request.id)
        .await
        .unwrap();
    assert_eq!(view.request.status, TransferStatus::Cancelled);
    assert!(view.details.iter().all(|d| d.status == TransferStatus::Cancelled));

    // The battery is free for a new request.
    app.services
        .transfers
        .create_request(order(first.id), staff)
        .await
        .unwrap();

    let started = app
        .services
        .transfers
        .create_request(order(second.id), staff)
        .await
        .unwrap();
    app.services
        .transfers
        .take_battery(central.slots[1].id)
        .await
        .unwrap();
    let err = app
        .services
        .transfers
        .cancel_request(started.request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}
