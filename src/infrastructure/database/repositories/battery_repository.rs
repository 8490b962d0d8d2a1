//! Batteries and battery types

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::expect_one;
use crate::domain::{Battery, BatteryStatus, BatteryType, DomainError, DomainResult};
use crate::infrastructure::database::entities::{battery, battery_type, cabinet, slot};

pub struct BatteryRepository<'a, C> {
    conn: &'a C,
}

/// Fields of a battery being provisioned
#[derive(Debug, Clone)]
pub struct NewBattery {
    pub battery_type_id: i32,
    pub serial_number: String,
    pub model: String,
    pub capacity: f64,
    pub status: BatteryStatus,
}

#[derive(Debug, Clone)]
pub struct NewBatteryType {
    pub name: String,
    pub capacity_kwh: f64,
    pub charge_rate_hours: Option<f64>,
    pub swap_price: i64,
}

/// Battery list filter
#[derive(Debug, Clone, Default)]
pub struct BatteryFilter {
    pub status: Option<BatteryStatus>,
    pub station_id: Option<i32>,
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: battery::Model) -> DomainResult<Battery> {
    Ok(Battery {
        id: m.id,
        battery_type_id: m.battery_type_id,
        serial_number: m.serial_number,
        model: m.model,
        capacity: m.capacity,
        cycle_count: m.cycle_count,
        health_score: m.health_score,
        status: m.status.parse()?,
        vehicle_id: m.vehicle_id,
        in_transfer: m.in_transfer,
        estimated_full_charge_at: m.estimated_full_charge_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn type_to_domain(m: battery_type::Model) -> BatteryType {
    BatteryType {
        id: m.id,
        name: m.name,
        capacity_kwh: m.capacity_kwh,
        charge_rate_hours: m.charge_rate_hours,
        swap_price: m.swap_price,
    }
}

impl<'a, C: ConnectionTrait> BatteryRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<Battery>> {
        battery::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn get(&self, id: i32) -> DomainResult<Battery> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", id))
    }

    pub async fn find_by_serial(&self, serial_number: &str) -> DomainResult<Option<Battery>> {
        battery::Entity::find()
            .filter(battery::Column::SerialNumber.eq(serial_number))
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Read for update.
    pub async fn lock(&self, id: i32) -> DomainResult<Option<Battery>> {
        battery::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Read for update, only if the battery currently has `status`.
    pub async fn lock_with_status(
        &self,
        id: i32,
        status: BatteryStatus,
    ) -> DomainResult<Option<Battery>> {
        battery::Entity::find_by_id(id)
            .filter(battery::Column::Status.eq(status.as_str()))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    pub async fn insert(&self, new: NewBattery) -> DomainResult<Battery> {
        let now = Utc::now();
        let model = battery::ActiveModel {
            id: NotSet,
            battery_type_id: Set(new.battery_type_id),
            serial_number: Set(new.serial_number),
            model: Set(new.model),
            capacity: Set(new.capacity),
            cycle_count: Set(0),
            health_score: Set(100.0),
            status: Set(new.status.as_str().to_string()),
            vehicle_id: Set(None),
            in_transfer: Set(false),
            estimated_full_charge_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        model_to_domain(model)
    }

    /// Persist every mutable field, guarded by the status that was read.
    pub async fn save(&self, b: &Battery, expected: BatteryStatus) -> DomainResult<()> {
        debug!(battery_id = b.id, from = %expected, to = %b.status, "Saving battery");

        let res = battery::Entity::update_many()
            .set(battery::ActiveModel {
                id: NotSet,
                battery_type_id: Set(b.battery_type_id),
                serial_number: Set(b.serial_number.clone()),
                model: Set(b.model.clone()),
                capacity: Set(b.capacity),
                cycle_count: Set(b.cycle_count),
                health_score: Set(b.health_score),
                status: Set(b.status.as_str().to_string()),
                vehicle_id: Set(b.vehicle_id),
                in_transfer: Set(b.in_transfer),
                estimated_full_charge_at: Set(b.estimated_full_charge_at),
                created_at: NotSet,
                updated_at: Set(Utc::now()),
            })
            .filter(battery::Column::Id.eq(b.id))
            .filter(battery::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "Battery", b.id)
    }

    pub async fn list(&self, filter: BatteryFilter) -> DomainResult<Vec<Battery>> {
        let mut query = battery::Entity::find().order_by_asc(battery::Column::Id);

        if let Some(status) = filter.status {
            query = query.filter(battery::Column::Status.eq(status.as_str()));
        }
        if let Some(station_id) = filter.station_id {
            let ids: Vec<Option<i32>> = slot::Entity::find()
                .select_only()
                .column(slot::Column::BatteryId)
                .inner_join(cabinet::Entity)
                .filter(cabinet::Column::StationId.eq(station_id))
                .filter(slot::Column::BatteryId.is_not_null())
                .into_tuple()
                .all(self.conn)
                .await?;
            query = query.filter(battery::Column::Id.is_in(ids.into_iter().flatten()));
        }

        query
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    /// Charging batteries whose estimate has passed.
    pub async fn due_charging(&self, now: DateTime<Utc>) -> DomainResult<Vec<Battery>> {
        battery::Entity::find()
            .filter(battery::Column::Status.eq(BatteryStatus::Charging.as_str()))
            .filter(battery::Column::EstimatedFullChargeAt.lte(now))
            .all(self.conn)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    pub async fn find_type(&self, id: i32) -> DomainResult<Option<BatteryType>> {
        Ok(battery_type::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(type_to_domain))
    }

    pub async fn get_type(&self, id: i32) -> DomainResult<BatteryType> {
        self.find_type(id)
            .await?
            .ok_or_else(|| DomainError::not_found("BatteryType", id))
    }

    pub async fn list_types(&self) -> DomainResult<Vec<BatteryType>> {
        Ok(battery_type::Entity::find()
            .order_by_asc(battery_type::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(type_to_domain)
            .collect())
    }

    pub async fn insert_type(&self, new: NewBatteryType) -> DomainResult<BatteryType> {
        let model = battery_type::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            capacity_kwh: Set(new.capacity_kwh),
            charge_rate_hours: Set(new.charge_rate_hours),
            swap_price: Set(new.swap_price),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(type_to_domain(model))
    }
}
