//! Battery DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Battery, BatteryType};
use crate::infrastructure::database::repositories::history_repository::BatteryUse;

#[derive(Debug, Serialize, ToSchema)]
pub struct BatteryResponse {
    pub id: i32,
    pub battery_type_id: i32,
    pub serial_number: String,
    pub model: String,
    /// Current charge, percent
    pub capacity: f64,
    pub cycle_count: i32,
    pub health_score: f64,
    pub status: String,
    pub vehicle_id: Option<i32>,
    pub in_transfer: bool,
    pub estimated_full_charge_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Battery> for BatteryResponse {
    fn from(b: Battery) -> Self {
        Self {
            id: b.id,
            battery_type_id: b.battery_type_id,
            serial_number: b.serial_number,
            model: b.model,
            capacity: b.capacity,
            cycle_count: b.cycle_count,
            health_score: b.health_score,
            status: b.status.to_string(),
            vehicle_id: b.vehicle_id,
            in_transfer: b.in_transfer,
            estimated_full_charge_at: b.estimated_full_charge_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatteryTypeResponse {
    pub id: i32,
    pub name: String,
    pub capacity_kwh: f64,
    pub charge_rate_hours: Option<f64>,
    /// VND per swap
    pub swap_price: i64,
}

impl From<BatteryType> for BatteryTypeResponse {
    fn from(t: BatteryType) -> Self {
        Self {
            id: t.id,
            name: t.name,
            capacity_kwh: t.capacity_kwh,
            charge_rate_hours: t.charge_rate_hours,
            swap_price: t.swap_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatteryUseResponse {
    pub vehicle_id: i32,
    pub booking_id: i32,
    pub cycle_count: i32,
    pub capacity: f64,
    pub health_score: f64,
    pub price: i64,
}

impl From<BatteryUse> for BatteryUseResponse {
    fn from(u: BatteryUse) -> Self {
        Self {
            vehicle_id: u.vehicle_id,
            booking_id: u.booking_id,
            cycle_count: u.cycle_count,
            capacity: u.capacity,
            health_score: u.health_score,
            price: u.price,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BatteryListQuery {
    /// AVAILABLE, IN_USE, CHARGING, RESERVED, DAMAGED or RETIRED
    pub status: Option<String>,
    pub station_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatteryRequest {
    #[validate(range(min = 1, message = "battery_type_id is required"))]
    pub battery_type_id: i32,
    #[validate(length(min = 1, max = 64, message = "serial_number is required"))]
    pub serial_number: String,
    #[validate(length(min = 1, max = 100, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 0.0, max = 100.0, message = "capacity must be 0-100"))]
    pub capacity: f64,
    /// AVAILABLE (default), CHARGING or DAMAGED
    pub status: Option<String>,
    /// Seat the new battery into this empty slot
    pub slot_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBatteryStatusRequest {
    /// AVAILABLE, CHARGING or DAMAGED
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatteryTypeRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "capacity_kwh must be positive"))]
    pub capacity_kwh: f64,
    #[validate(range(
        exclusive_min = 0.0,
        max = 48.0,
        message = "charge_rate_hours must be within 0..=48"
    ))]
    pub charge_rate_hours: Option<f64>,
    #[validate(range(min = 0, message = "swap_price must not be negative"))]
    pub swap_price: i64,
}
