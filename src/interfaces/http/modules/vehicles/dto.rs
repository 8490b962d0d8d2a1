//! Vehicle DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Vehicle, VehicleType};

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleResponse {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_type_id: i32,
    pub license_plate: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            user_id: v.user_id,
            vehicle_type_id: v.vehicle_type_id,
            license_plate: v.license_plate,
            is_active: v.is_active,
            created_at: v.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleTypeResponse {
    pub id: i32,
    pub name: String,
    /// The only battery type this vehicle takes
    pub battery_type_id: i32,
}

impl From<VehicleType> for VehicleTypeResponse {
    fn from(t: VehicleType) -> Self {
        Self {
            id: t.id,
            name: t.name,
            battery_type_id: t.battery_type_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterVehicleRequest {
    #[validate(range(min = 1, message = "vehicle_type_id is required"))]
    pub vehicle_type_id: i32,
    #[validate(length(min = 1, max = 20, message = "license_plate must be 1-20 characters"))]
    pub license_plate: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleTypeRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "battery_type_id is required"))]
    pub battery_type_id: i32,
}
