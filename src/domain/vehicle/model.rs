//! Vehicles and the battery type they require

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct VehicleType {
    pub id: i32,
    pub name: String,
    pub battery_type_id: i32,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_type_id: i32,
    pub license_plate: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn require_owner(&self, user_id: i32) -> DomainResult<()> {
        if self.user_id != user_id || !self.is_active {
            return Err(DomainError::not_found("Vehicle", self.id));
        }
        Ok(())
    }
}

impl VehicleType {
    pub fn require_battery_type(&self, battery_type_id: i32) -> DomainResult<()> {
        if self.battery_type_id != battery_type_id {
            return Err(DomainError::bad_request(format!(
                "Battery type {} does not match vehicle type {} (requires {})",
                battery_type_id, self.name, self.battery_type_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_vehicle_looks_missing() {
        let v = Vehicle {
            id: 5,
            user_id: 1,
            vehicle_type_id: 2,
            license_plate: "59A-123.45".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(v.require_owner(1).is_ok());
        assert!(matches!(v.require_owner(2), Err(DomainError::NotFound { .. })));
    }

    #[test]
    fn battery_type_mismatch() {
        let t = VehicleType {
            id: 2,
            name: "VF e34".into(),
            battery_type_id: 1,
        };
        assert!(t.require_battery_type(1).is_ok());
        assert!(matches!(t.require_battery_type(3), Err(DomainError::BadRequest(_))));
    }
}
