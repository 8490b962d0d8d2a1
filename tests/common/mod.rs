//! Shared fixtures: migrated in-memory database, wired services, a scripted
//! payment gateway and a small station to work with.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use evswap::application::booking::ReservationRequest;
use evswap::application::inventory::NewBatteryPlacement;
use evswap::application::ports::{
    GatewayError, PaymentGateway, PaymentLink, PaymentLinkInfo, PaymentLinkRequest, WebhookData,
};
use evswap::application::{
    create_event_bus, AppServices, BookingPolicy, CheckoutUrls, QrLoginConfig, ServiceSettings,
};
use evswap::domain::charging::LinearHealthScorer;
use evswap::domain::payment::PaymentOutcome;
use evswap::domain::{Battery, BatteryStatus, Slot, UserMembership, UserRole};
use evswap::infrastructure::crypto::jwt::JwtConfig;
use evswap::infrastructure::database::migrator::Migrator;
use evswap::infrastructure::database::repositories::battery_repository::{
    NewBattery, NewBatteryType,
};
use evswap::infrastructure::database::repositories::membership_repository::NewPlan;
use evswap::infrastructure::database::repositories::station_repository::NewStation;
use evswap::infrastructure::database::repositories::user_repository::NewUser;
use evswap::infrastructure::{init_database, DatabaseConfig, Repositories};

pub const STATION_LAT: f64 = 10.7769;
pub const STATION_LNG: f64 = 106.7009;
pub const SWAP_PRICE: i64 = 50_000;

/// Gateway double. Links always succeed; webhooks carrying
/// `"signature": "ok"` verify; sync answers with the scripted status.
#[derive(Default)]
pub struct FakeGateway {
    pub links_created: AtomicUsize,
    pub statuses: DashMap<i64, String>,
}

impl FakeGateway {
    pub fn set_status(&self, order_code: i64, status: &str) {
        self.statuses.insert(order_code, status.to_string());
    }

    pub fn webhook(order_code: i64, code: &str) -> serde_json::Value {
        serde_json::json!({
            "signature": "ok",
            "data": { "orderCode": order_code, "amount": SWAP_PRICE, "code": code, "desc": "test" }
        })
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        self.links_created.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentLink {
            checkout_url: format!("https://pay.test/{}", request.order_code),
        })
    }

    async fn get_payment_link_information(
        &self,
        order_code: i64,
    ) -> Result<PaymentLinkInfo, GatewayError> {
        let status = self
            .statuses
            .get(&order_code)
            .map(|s| s.clone())
            .unwrap_or_else(|| "PENDING".to_string());
        Ok(PaymentLinkInfo {
            order_code,
            amount: 0,
            status,
        })
    }

    fn verify_webhook(&self, payload: &serde_json::Value) -> Result<WebhookData, GatewayError> {
        if payload["signature"] != "ok" {
            return Err(GatewayError::InvalidSignature);
        }
        let data = &payload["data"];
        Ok(WebhookData {
            order_code: data["orderCode"].as_i64().unwrap_or_default(),
            amount: data["amount"].as_i64().unwrap_or_default(),
            code: data["code"].as_str().unwrap_or_default().to_string(),
            description: data["desc"].as_str().unwrap_or_default().to_string(),
        })
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub services: AppServices,
    pub gateway: Arc<FakeGateway>,
}

pub async fn setup() -> TestApp {
    let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let gateway = Arc::new(FakeGateway::default());
    let services = AppServices::new(
        db.clone(),
        create_event_bus(),
        gateway.clone(),
        ServiceSettings {
            booking: BookingPolicy::default(),
            checkout: CheckoutUrls::default(),
            jwt: JwtConfig::new("integration-test", 1),
            qr_login: QrLoginConfig::default(),
            scorer: Arc::new(LinearHealthScorer::default()),
        },
    );
    TestApp {
        db,
        services,
        gateway,
    }
}

/// One station with one cabinet, a driver and their vehicle.
pub struct Station {
    pub station_id: i32,
    pub cabinet_id: i32,
    pub slots: Vec<Slot>,
    pub battery_type_id: i32,
    pub vehicle_type_id: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
}

impl TestApp {
    pub async fn insert_user(&self, email: &str, role: UserRole) -> i32 {
        Repositories::new(&self.db)
            .users()
            .insert(NewUser {
                email: email.to_string(),
                full_name: email.to_string(),
                phone: None,
                // Never used to log in.
                password_hash: "!".to_string(),
                role,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn battery_type(&self, name: &str) -> i32 {
        self.services
            .batteries
            .create_type(NewBatteryType {
                name: name.to_string(),
                capacity_kwh: 2.0,
                charge_rate_hours: Some(2.0),
                swap_price: SWAP_PRICE,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn station(
        &self,
        name: &str,
        battery_type_id: i32,
        slot_count: i32,
    ) -> (i32, i32, Vec<Slot>) {
        let station = self
            .services
            .stations
            .create(NewStation {
                name: name.to_string(),
                address: format!("{} street", name),
                latitude: STATION_LAT,
                longitude: STATION_LNG,
                open_time: None,
                close_time: None,
            })
            .await
            .unwrap();
        let cabinet = self
            .services
            .stations
            .create_cabinet(station.id, battery_type_id, "A".to_string(), slot_count)
            .await
            .unwrap();
        (station.id, cabinet.cabinet.id, cabinet.slots)
    }

    /// Station "Central" with `slot_count` empty slots and a driver whose
    /// vehicle takes its battery type.
    pub async fn seed(&self, slot_count: i32) -> Station {
        let battery_type_id = self.battery_type("48V 20Ah").await;
        let (station_id, cabinet_id, slots) =
            self.station("Central", battery_type_id, slot_count).await;
        let vehicle_type_id = self
            .services
            .vehicles
            .create_type("Scooter".to_string(), battery_type_id)
            .await
            .unwrap()
            .id;
        let driver_id = self.insert_user("driver@evswap.test", UserRole::Driver).await;
        let vehicle_id = self
            .services
            .vehicles
            .register(driver_id, vehicle_type_id, "59A-123.45")
            .await
            .unwrap()
            .id;
        Station {
            station_id,
            cabinet_id,
            slots,
            battery_type_id,
            vehicle_type_id,
            driver_id,
            vehicle_id,
        }
    }

    /// A battery with `status`, seated in `slot_id` when given.
    pub async fn battery(
        &self,
        battery_type_id: i32,
        serial: &str,
        status: BatteryStatus,
        slot_id: Option<i32>,
    ) -> Battery {
        self.services
            .batteries
            .create(NewBatteryPlacement {
                battery: NewBattery {
                    battery_type_id,
                    serial_number: serial.to_string(),
                    model: "LFP".to_string(),
                    capacity: 100.0,
                    status,
                },
                slot_id,
            })
            .await
            .unwrap()
    }

    /// A battery already riding on `vehicle_id`, as after an earlier swap.
    pub async fn battery_on_vehicle(
        &self,
        battery_type_id: i32,
        serial: &str,
        vehicle_id: i32,
    ) -> Battery {
        let mut battery = self
            .battery(battery_type_id, serial, BatteryStatus::Available, None)
            .await;
        battery.status = BatteryStatus::InUse;
        battery.vehicle_id = Some(vehicle_id);
        battery.capacity = 25.0;
        Repositories::new(&self.db)
            .batteries()
            .save(&battery, BatteryStatus::Available)
            .await
            .unwrap();
        battery
    }

    /// A paid, active membership with `swap_limit` swaps.
    pub async fn active_membership(&self, user_id: i32, swap_limit: i32) -> UserMembership {
        let plan = self
            .services
            .memberships
            .create_plan(NewPlan {
                name: format!("{} swaps", swap_limit),
                description: None,
                price: 200_000,
                duration_days: 30,
                swap_limit,
            })
            .await
            .unwrap();
        let purchase = self.services.memberships.purchase(user_id, plan.id).await.unwrap();
        self.services
            .payments
            .settle(purchase.transaction.order_code, PaymentOutcome::Paid, "", Utc::now())
            .await
            .unwrap();
        self.membership(user_id).await
    }

    pub async fn membership(&self, user_id: i32) -> UserMembership {
        self.services
            .memberships
            .list_user_memberships(user_id)
            .await
            .unwrap()
            .remove(0)
    }

    pub async fn slot(&self, slot_id: i32) -> Slot {
        Repositories::new(&self.db)
            .slots()
            .find(slot_id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn reload_battery(&self, battery_id: i32) -> Battery {
        self.services.batteries.get(battery_id).await.unwrap()
    }
}

pub fn reservation(station: &Station, battery_ids: Vec<i32>) -> ReservationRequest {
    ReservationRequest {
        user_id: station.driver_id,
        vehicle_id: station.vehicle_id,
        station_id: station.station_id,
        battery_ids,
        user_lat: STATION_LAT + 0.01,
        user_lng: STATION_LNG,
    }
}
