mod common;

use std::sync::atomic::Ordering;

use chrono::Utc;

use common::{reservation, setup, FakeGateway, Station, TestApp};
use evswap::application::booking::BookingCreated;
use evswap::application::{Actor, EventSubscriber};
use evswap::domain::events::Event;
use evswap::domain::payment::PaymentOutcome;
use evswap::domain::{
    BatteryStatus, BookingStatus, DomainError, MembershipStatus, PaymentTransaction, SlotStatus,
    TransactionStatus, UserRole,
};
use evswap::infrastructure::database::repositories::membership_repository::NewPlan;

async fn pending_booking(app: &TestApp, station: &Station) -> (BookingCreated, PaymentTransaction) {
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
        .create_booking(reservation(station, vec![battery.id]))
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
    (created, transaction)
}

async fn booking_status(app: &TestApp, station: &Station, booking_id: i32) -> BookingStatus {
    app.services
        .bookings
        .get_booking(booking_id, Actor::new(station.driver_id, UserRole::Driver))
        .await
        .unwrap()
        .booking
        .status
}

fn drain(subscriber: &mut EventSubscriber) -> Vec<Event> {
    std::iter::from_fn(|| subscriber.try_recv())
        .map(|message| message.event)
        .collect()
}

#[tokio::test]
async fn booking_gets_a_checkout_link() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;

    assert_eq!(app.gateway.links_created.load(Ordering::SeqCst), 1);
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(transaction.amount, created.total_price);
    assert_eq!(
        transaction.checkout_url.as_deref(),
        Some(format!("https://pay.test/{}", transaction.order_code).as_str())
    );
}

#[tokio::test]
async fn paid_webhook_confirms_booking() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;
    let mut events = app.services.events.subscribe();

    let settled = app
        .services
        .payments
        .handle_webhook(&FakeGateway::webhook(transaction.order_code, "00"))
        .await
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Paid);
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Reserved);

    let confirmed = drain(&mut events).into_iter().any(|event| {
        matches!(event, Event::PaymentConfirmed(e) if e.booking_id == Some(created.booking_id))
    });
    assert!(confirmed);
}

#[tokio::test]
async fn settling_twice_changes_nothing() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;

    app.services
        .payments
        .settle(transaction.order_code, PaymentOutcome::Paid, "", Utc::now())
        .await
        .unwrap();
    let mut events = app.services.events.subscribe();

    // A late failure report must not undo the payment.
    let again = app
        .services
        .payments
        .settle(transaction.order_code, PaymentOutcome::Failed, "late", Utc::now())
        .await
        .unwrap();
    assert_eq!(again.status, TransactionStatus::Paid);
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Reserved);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn failed_webhook_cancels_booking_and_frees_battery() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;
    let mut events = app.services.events.subscribe();

    let settled = app
        .services
        .payments
        .handle_webhook(&FakeGateway::webhook(transaction.order_code, "01"))
        .await
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Failed);
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Cancelled);
    assert_eq!(app.slot(station.slots[0].id).await.status, SlotStatus::Available);

    let failed = drain(&mut events).into_iter().any(|event| {
        matches!(event, Event::PaymentFailed(e) if e.transaction_id == transaction.id)
    });
    assert!(failed);
}

#[tokio::test]
async fn forged_webhook_is_rejected() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;

    let mut payload = FakeGateway::webhook(transaction.order_code, "00");
    payload["signature"] = serde_json::json!("forged");
    let err = app.services.payments.handle_webhook(&payload).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Pending);
}

#[tokio::test]
async fn sync_applies_gateway_status() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;

    let unchanged = app
        .services
        .payments
        .sync_status(transaction.order_code)
        .await
        .unwrap();
    assert_eq!(unchanged.status, TransactionStatus::Pending);

    app.gateway.set_status(transaction.order_code, "PAID");
    let paid = app
        .services
        .payments
        .sync_status(transaction.order_code)
        .await
        .unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Reserved);
}

#[tokio::test]
async fn unknown_order_code_is_not_found() {
    let app = setup().await;
    let err = app
        .services
        .payments
        .settle(987_654_321, PaymentOutcome::Paid, "", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn cancelled_membership_payment_never_activates() {
    let app = setup().await;
    let station = app.seed(1).await;
    let plan = app
        .services
        .memberships
        .create_plan(NewPlan {
            name: "Monthly".to_string(),
            description: None,
            price: 300_000,
            duration_days: 30,
            swap_limit: 10,
        })
        .await
        .unwrap();
    let purchase = app
        .services
        .memberships
        .purchase(station.driver_id, plan.id)
        .await
        .unwrap();
    assert_eq!(purchase.membership.status, MembershipStatus::Pending);
    assert!(purchase.checkout_url.is_some());

    app.services
        .payments
        .settle(purchase.transaction.order_code, PaymentOutcome::Cancelled, "", Utc::now())
        .await
        .unwrap();
    let membership = app.membership(station.driver_id).await;
    assert_eq!(membership.status, MembershipStatus::Cancelled);
    assert_eq!(membership.remaining_swaps, 0);
}

#[tokio::test]
async fn underpaid_webhook_leaves_booking_pending() {
    let app = setup().await;
    let station = app.seed(2).await;
    let (created, transaction) = pending_booking(&app, &station).await;

    let mut payload = FakeGateway::webhook(transaction.order_code, "00");
    payload["data"]["amount"] = serde_json::json!(transaction.amount - 1);
    let err = app.services.payments.handle_webhook(&payload).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(ref m) if m.contains("does not match")));

    let reloaded = app
        .services
        .payments
        .get_transaction(transaction.id, Actor::new(station.driver_id, UserRole::Driver))
        .await
        .unwrap();
    assert_eq!(reloaded.status, TransactionStatus::Pending);
    assert_eq!(booking_status(&app, &station, created.booking_id).await, BookingStatus::Pending);

    // The exact amount still goes through afterwards.
    let settled = app
        .services
        .payments
        .handle_webhook(&FakeGateway::webhook(transaction.order_code, "00"))
        .await
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Paid);
}
