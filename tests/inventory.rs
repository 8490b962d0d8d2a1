mod common;

use chrono::{Duration, Utc};

use common::{reservation, setup, STATION_LAT, STATION_LNG};
use evswap::application::inventory::{NewBatteryPlacement, StationUpdate};
use evswap::domain::events::Event;
use evswap::domain::{BatteryStatus, DomainError, SlotStatus};
use evswap::infrastructure::database::repositories::battery_repository::{
    NewBattery, NewBatteryType,
};

#[tokio::test]
async fn charged_batteries_become_available() {
    let app = setup().await;
    let station = app.seed(1).await;
    let slot_id = station.slots[0].id;
    let battery = app
        .battery(station.battery_type_id, "BAT-1", BatteryStatus::Available, Some(slot_id))
        .await;

    let charging = app
        .services
        .batteries
        .update_status(battery.id, BatteryStatus::Charging)
        .await
        .unwrap();
    assert_eq!(charging.status, BatteryStatus::Charging);
    assert_eq!(app.slot(slot_id).await.status, SlotStatus::Charging);

    let done = app
        .services
        .batteries
        .complete_charging(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(done, 0);

    let mut events = app.services.events.subscribe();
    let done = app
        .services
        .batteries
        .complete_charging(Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(done, 1);

    let battery = app.reload_battery(battery.id).await;
    assert_eq!(battery.status, BatteryStatus::Available);
    assert_eq!(battery.capacity, 100.0);
    assert!(battery.estimated_full_charge_at.is_none());
    assert_eq!(app.slot(slot_id).await.status, SlotStatus::Available);

    let message = events.try_recv().unwrap();
    assert!(matches!(message.event, Event::BatteryAvailable(e) if e.battery_id == battery.id));
}

#[tokio::test]
async fn only_manual_statuses_can_be_set() {
    let app = setup().await;
    let station = app.seed(1).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-1",
            BatteryStatus::Available,
            Some(station.slots[0].id),
        )
        .await;

    for status in [BatteryStatus::InUse, BatteryStatus::Reserved, BatteryStatus::Retired] {
        let err = app
            .services
            .batteries
            .update_status(battery.id, status)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    let damaged = app
        .services
        .batteries
        .update_status(battery.id, BatteryStatus::Damaged)
        .await
        .unwrap();
    assert_eq!(damaged.status, BatteryStatus::Damaged);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::DamagedBattery);
}

#[tokio::test]
async fn reserved_battery_is_off_limits() {
    let app = setup().await;
    let station = app.seed(1).await;
    let battery = app
        .battery(
            station.battery_type_id,
            "BAT-1",
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
        .batteries
        .update_status(battery.id, BatteryStatus::Damaged)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    let err = app.services.batteries.retire(battery.id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
}

#[tokio::test]
async fn retired_battery_leaves_its_slot() {
    let app = setup().await;
    let station = app.seed(1).await;
    let slot_id = station.slots[0].id;
    let battery = app
        .battery(station.battery_type_id, "BAT-1", BatteryStatus::Damaged, Some(slot_id))
        .await;

    let retired = app.services.batteries.retire(battery.id).await.unwrap();
    assert_eq!(retired.status, BatteryStatus::Retired);
    let slot = app.slot(slot_id).await;
    assert_eq!(slot.status, SlotStatus::Empty);
    assert_eq!(slot.battery_id, None);
}

#[tokio::test]
async fn serial_numbers_are_unique() {
    let app = setup().await;
    let station = app.seed(1).await;
    app.battery(station.battery_type_id, "BAT-1", BatteryStatus::Available, None)
        .await;

    let err = app
        .services
        .batteries
        .create(NewBatteryPlacement {
            battery: NewBattery {
                battery_type_id: station.battery_type_id,
                serial_number: "BAT-1".to_string(),
                model: "LFP".to_string(),
                capacity: 100.0,
                status: BatteryStatus::Available,
            },
            slot_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn battery_of_another_type_does_not_fit_the_cabinet() {
    let app = setup().await;
    let station = app.seed(1).await;
    let other_type = app.battery_type("72V 30Ah").await;

    let err = app
        .services
        .batteries
        .create(NewBatteryPlacement {
            battery: NewBattery {
                battery_type_id: other_type,
                serial_number: "BAT-72".to_string(),
                model: "NMC".to_string(),
                capacity: 100.0,
                status: BatteryStatus::Available,
            },
            slot_id: Some(station.slots[0].id),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Empty);
}

#[tokio::test]
async fn nearest_stations_are_sorted_by_distance() {
    let app = setup().await;
    let station = app.seed(1).await;
    let (far_id, _, _) = app.station("Far", station.battery_type_id, 1).await;
    app.services
        .stations
        .update(
            far_id,
            StationUpdate {
                latitude: Some(STATION_LAT + 0.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let nearby = app
        .services
        .stations
        .nearest(STATION_LAT + 0.01, STATION_LNG, 5)
        .await
        .unwrap();
    let ids: Vec<i32> = nearby.iter().map(|n| n.station.id).collect();
    assert_eq!(ids, vec![station.station_id, far_id]);
    assert!(nearby[0].distance_km < nearby[1].distance_km);
}

#[tokio::test]
async fn battery_type_charge_rate_is_bounded() {
    let app = setup().await;

    for rate in [0.0, -1.0, 48.5, 1e10] {
        let err = app
            .services
            .batteries
            .create_type(NewBatteryType {
                name: format!("rate-{}", rate),
                capacity_kwh: 2.0,
                charge_rate_hours: Some(rate),
                swap_price: 10_000,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)), "rate {} accepted", rate);
    }

    let slow = app
        .services
        .batteries
        .create_type(NewBatteryType {
            name: "slow".into(),
            capacity_kwh: 2.0,
            charge_rate_hours: Some(48.0),
            swap_price: 10_000,
        })
        .await
        .unwrap();
    assert_eq!(slow.charge_rate_hours, Some(48.0));
}
