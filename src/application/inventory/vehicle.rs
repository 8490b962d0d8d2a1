use sea_orm::DatabaseConnection;
use tracing::info;

use crate::application::actor::Actor;
use crate::domain::{DomainError, DomainResult, Vehicle, VehicleType};
use crate::infrastructure::database::repositories::vehicle_repository::NewVehicle;
use crate::infrastructure::database::Repositories;

pub struct VehicleService {
    db: DatabaseConnection,
}

impl VehicleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a vehicle for the calling driver.
    pub async fn register(
        &self,
        user_id: i32,
        vehicle_type_id: i32,
        license_plate: &str,
    ) -> DomainResult<Vehicle> {
        let plate = license_plate.trim();
        if plate.is_empty() {
            return Err(DomainError::bad_request("License plate is required"));
        }

        let repos = Repositories::new(&self.db);
        repos.vehicles().get_type(vehicle_type_id).await?;
        if repos.vehicles().find_by_plate(plate).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "License plate {} is already registered",
                plate.to_uppercase()
            )));
        }

        let vehicle = repos
            .vehicles()
            .insert(NewVehicle {
                user_id,
                vehicle_type_id,
                license_plate: plate.to_string(),
            })
            .await?;
        info!(vehicle_id = vehicle.id, user_id, "Vehicle registered");
        Ok(vehicle)
    }

    pub async fn list_mine(&self, user_id: i32) -> DomainResult<Vec<Vehicle>> {
        Repositories::new(&self.db).vehicles().list_by_user(user_id).await
    }

    pub async fn deactivate(&self, vehicle_id: i32, actor: Actor) -> DomainResult<()> {
        let repos = Repositories::new(&self.db);
        let vehicle = repos.vehicles().get(vehicle_id).await?;
        actor.require_owner_or_staff(vehicle.user_id)?;
        repos.vehicles().deactivate(vehicle.id).await?;
        info!(vehicle_id, "Vehicle deactivated");
        Ok(())
    }

    pub async fn list_types(&self) -> DomainResult<Vec<VehicleType>> {
        Repositories::new(&self.db).vehicles().list_types().await
    }

    pub async fn create_type(
        &self,
        name: String,
        battery_type_id: i32,
    ) -> DomainResult<VehicleType> {
        let repos = Repositories::new(&self.db);
        repos.batteries().get_type(battery_type_id).await?;
        let vehicle_type = repos.vehicles().insert_type(name, battery_type_id).await?;
        info!(vehicle_type_id = vehicle_type.id, "Vehicle type created");
        Ok(vehicle_type)
    }
}
