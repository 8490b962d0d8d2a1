//! Vehicles and vehicle types

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, DomainResult, Vehicle, VehicleType};
use crate::infrastructure::database::entities::{vehicle, vehicle_type};

pub struct VehicleRepository<'a, C> {
    conn: &'a C,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub user_id: i32,
    pub vehicle_type_id: i32,
    pub license_plate: String,
}

fn model_to_domain(m: vehicle::Model) -> Vehicle {
    Vehicle {
        id: m.id,
        user_id: m.user_id,
        vehicle_type_id: m.vehicle_type_id,
        license_plate: m.license_plate,
        is_active: m.status == "ACTIVE",
        created_at: m.created_at,
    }
}

fn type_to_domain(m: vehicle_type::Model) -> VehicleType {
    VehicleType {
        id: m.id,
        name: m.name,
        battery_type_id: m.battery_type_id,
    }
}

impl<'a, C: ConnectionTrait> VehicleRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        Ok(vehicle::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain))
    }

    pub async fn get(&self, id: i32) -> DomainResult<Vehicle> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    pub async fn list_by_user(&self, user_id: i32) -> DomainResult<Vec<Vehicle>> {
        Ok(vehicle::Entity::find()
            .filter(vehicle::Column::UserId.eq(user_id))
            .filter(vehicle::Column::Status.eq("ACTIVE"))
            .order_by_asc(vehicle::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect())
    }

    pub async fn find_by_plate(&self, license_plate: &str) -> DomainResult<Option<Vehicle>> {
        Ok(vehicle::Entity::find()
            .filter(vehicle::Column::LicensePlate.eq(license_plate.trim().to_uppercase()))
            .one(self.conn)
            .await?
            .map(model_to_domain))
    }

    pub async fn insert(&self, new: NewVehicle) -> DomainResult<Vehicle> {
        let model = vehicle::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id),
            vehicle_type_id: Set(new.vehicle_type_id),
            license_plate: Set(new.license_plate.trim().to_uppercase()),
            status: Set("ACTIVE".to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(model_to_domain(model))
    }

    pub async fn deactivate(&self, id: i32) -> DomainResult<()> {
        vehicle::ActiveModel {
            id: Set(id),
            status: Set("INACTIVE".to_string()),
            ..Default::default()
        }
        .update(self.conn)
        .await?;
        Ok(())
    }

    pub async fn find_type(&self, id: i32) -> DomainResult<Option<VehicleType>> {
        Ok(vehicle_type::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(type_to_domain))
    }

    pub async fn get_type(&self, id: i32) -> DomainResult<VehicleType> {
        self.find_type(id)
            .await?
            .ok_or_else(|| DomainError::not_found("VehicleType", id))
    }

    pub async fn list_types(&self) -> DomainResult<Vec<VehicleType>> {
        Ok(vehicle_type::Entity::find()
            .order_by_asc(vehicle_type::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(type_to_domain)
            .collect())
    }

    pub async fn insert_type(
        &self,
        name: String,
        battery_type_id: i32,
    ) -> DomainResult<VehicleType> {
        let model = vehicle_type::ActiveModel {
            id: NotSet,
            name: Set(name),
            battery_type_id: Set(battery_type_id),
        }
        .insert(self.conn)
        .await?;
        Ok(type_to_domain(model))
    }
}
