//! Station DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::inventory::{CabinetSlots, NearbyStation, SlotView, StationDetail};
use crate::domain::{Cabinet, Slot, Station};
use crate::infrastructure::database::repositories::history_repository::SlotHistoryEntry;
use crate::interfaces::http::modules::batteries::BatteryResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct StationResponse {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `HH:MM:SS`, local station time
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Station> for StationResponse {
    fn from(s: Station) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
            latitude: s.latitude,
            longitude: s.longitude,
            open_time: s.open_time,
            close_time: s.close_time,
            status: s.status.to_string(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    pub id: i32,
    pub cabinet_id: i32,
    pub slot_number: i32,
    pub battery_id: Option<i32>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Slot> for SlotResponse {
    fn from(s: Slot) -> Self {
        Self {
            id: s.id,
            cabinet_id: s.cabinet_id,
            slot_number: s.slot_number,
            battery_id: s.battery_id,
            status: s.status.to_string(),
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CabinetResponse {
    pub id: i32,
    pub station_id: i32,
    pub battery_type_id: i32,
    pub name: String,
    pub status: String,
    pub slots: Vec<SlotResponse>,
}

impl CabinetResponse {
    fn new(cabinet: Cabinet, slots: Vec<Slot>) -> Self {
        Self {
            id: cabinet.id,
            station_id: cabinet.station_id,
            battery_type_id: cabinet.battery_type_id,
            name: cabinet.name,
            status: cabinet.status.to_string(),
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CabinetSlots> for CabinetResponse {
    fn from(c: CabinetSlots) -> Self {
        Self::new(c.cabinet, c.slots)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationDetailResponse {
    #[serde(flatten)]
    pub station: StationResponse,
    pub available_batteries: u64,
    pub cabinets: Vec<CabinetResponse>,
}

impl From<StationDetail> for StationDetailResponse {
    fn from(d: StationDetail) -> Self {
        Self {
            station: d.station.into(),
            available_batteries: d.available_batteries,
            cabinets: d.cabinets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyStationResponse {
    #[serde(flatten)]
    pub station: StationResponse,
    pub distance_km: f64,
    pub available_batteries: u64,
}

impl From<NearbyStation> for NearbyStationResponse {
    fn from(n: NearbyStation) -> Self {
        Self {
            station: n.station.into(),
            distance_km: (n.distance_km * 100.0).round() / 100.0,
            available_batteries: n.available_batteries,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotViewResponse {
    #[serde(flatten)]
    pub slot: SlotResponse,
    pub battery: Option<BatteryResponse>,
}

impl From<SlotView> for SlotViewResponse {
    fn from(v: SlotView) -> Self {
        Self {
            slot: v.slot.into(),
            battery: v.battery.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotHistoryResponse {
    pub slot_id: i32,
    pub battery_id: i32,
    pub booking_id: Option<i32>,
    pub transfer_request_id: Option<i32>,
    /// IN or OUT
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl From<SlotHistoryEntry> for SlotHistoryResponse {
    fn from(h: SlotHistoryEntry) -> Self {
        Self {
            slot_id: h.slot_id,
            battery_id: h.battery_id,
            booking_id: h.booking_id,
            transfer_request_id: h.transfer_request_id,
            action: h.action,
            created_at: h.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NearestQuery {
    pub lat: f64,
    pub lng: f64,
    /// Default 5, at most 50
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStationRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "address is required"))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within -90..90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within -180..180"))]
    pub longitude: f64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStationRequest {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "address must not be empty"))]
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    /// ACTIVE, INACTIVE or MAINTENANCE
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCabinetRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "battery_type_id is required"))]
    pub battery_type_id: i32,
    #[validate(range(min = 1, max = 64, message = "slot_count must be 1-64"))]
    pub slot_count: i32,
}
