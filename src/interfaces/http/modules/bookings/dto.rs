//! Booking DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::booking::{BookingCreated, BookingView, PutOutcome, TakeOutcome};
use crate::domain::{Booking, BookingDetail};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "vehicle_id is required"))]
    pub vehicle_id: i32,
    #[validate(range(min = 1, message = "station_id is required"))]
    pub station_id: i32,
    #[validate(length(min = 1, max = 10, message = "request 1-10 batteries"))]
    pub battery_ids: Vec<i32>,
    /// Driver's current position
    #[validate(range(min = -90.0, max = 90.0, message = "user_lat must be within -90..90"))]
    pub user_lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "user_lng must be within -180..180"))]
    pub user_lng: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreatedResponse {
    pub booking_id: i32,
    pub status: String,
    pub expected_pickup_time: DateTime<Utc>,
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub total_price: i64,
    /// Set when the swaps came off a membership
    pub user_membership_id: Option<i32>,
    /// Set when the booking must be paid
    pub transaction_id: Option<i32>,
    pub checkout_url: Option<String>,
}

impl From<BookingCreated> for BookingCreatedResponse {
    fn from(c: BookingCreated) -> Self {
        Self {
            booking_id: c.booking_id,
            status: c.status.to_string(),
            expected_pickup_time: c.expected_pickup_time,
            distance_km: c.distance_km,
            travel_minutes: c.travel_minutes,
            total_price: c.total_price,
            user_membership_id: c.user_membership_id,
            transaction_id: c.transaction_id,
            checkout_url: c.checkout_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub station_id: i32,
    pub user_membership_id: Option<i32>,
    pub transaction_id: Option<i32>,
    pub expected_pickup_time: DateTime<Utc>,
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            vehicle_id: b.vehicle_id,
            station_id: b.station_id,
            user_membership_id: b.user_membership_id,
            transaction_id: b.transaction_id,
            expected_pickup_time: b.expected_pickup_time,
            distance_km: b.distance_km,
            travel_minutes: b.travel_minutes,
            status: b.status.to_string(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetailResponse {
    pub id: i32,
    pub battery_id: i32,
    pub price: i64,
    pub status: String,
}

impl From<BookingDetail> for BookingDetailResponse {
    fn from(d: BookingDetail) -> Self {
        Self {
            id: d.id,
            battery_id: d.battery_id,
            price: d.price,
            status: d.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingViewResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub total_price: i64,
    pub details: Vec<BookingDetailResponse>,
}

impl From<BookingView> for BookingViewResponse {
    fn from(v: BookingView) -> Self {
        let total_price = v.total_price();
        Self {
            booking: v.booking.into(),
            total_price,
            details: v.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TakeBatteryRequest {
    #[validate(range(min = 1, message = "slot_id is required"))]
    pub slot_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PutBatteryRequest {
    #[validate(range(min = 1, message = "slot_id is required"))]
    pub slot_id: i32,
    #[validate(range(min = 1, message = "battery_id is required"))]
    pub battery_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TakeBatteryResponse {
    pub booking_id: i32,
    pub slot_id: i32,
    pub battery_id: i32,
    pub booking_status: String,
}

impl From<TakeOutcome> for TakeBatteryResponse {
    fn from(t: TakeOutcome) -> Self {
        Self {
            booking_id: t.booking_id,
            slot_id: t.slot_id,
            battery_id: t.battery_id,
            booking_status: t.booking_status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PutBatteryResponse {
    pub booking_id: i32,
    pub slot_id: i32,
    pub battery_id: i32,
    pub estimated_full_charge_at: Option<DateTime<Utc>>,
}

impl From<PutOutcome> for PutBatteryResponse {
    fn from(p: PutOutcome) -> Self {
        Self {
            booking_id: p.booking_id,
            slot_id: p.slot_id,
            battery_id: p.battery_id,
            estimated_full_charge_at: p.estimated_full_charge_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StationBookingsQuery {
    /// Only bookings in this status
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
