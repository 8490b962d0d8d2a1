//! Cabinet slots

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::expect_one;
use crate::domain::{DomainError, DomainResult, Slot, SlotStatus};
use crate::infrastructure::database::entities::{cabinet, slot};

pub struct SlotRepository<'a, C> {
    conn: &'a C,
}

fn model_to_domain(m: slot::Model) -> DomainResult<Slot> {
    Ok(Slot {
        id: m.id,
        cabinet_id: m.cabinet_id,
        slot_number: m.slot_number,
        battery_id: m.battery_id,
        status: m.status.parse()?,
        updated_at: m.updated_at,
    })
}

fn all_to_domain(models: Vec<slot::Model>) -> DomainResult<Vec<Slot>> {
    models.into_iter().map(model_to_domain).collect()
}

impl<'a, C: ConnectionTrait> SlotRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: i32) -> DomainResult<Option<Slot>> {
        slot::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Read for update, `NotFound` when absent.
    pub async fn lock(&self, id: i32) -> DomainResult<Slot> {
        slot::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("Slot", id))
    }

    /// Read for update the slot holding `battery_id`.
    pub async fn lock_by_battery(&self, battery_id: i32) -> DomainResult<Option<Slot>> {
        slot::Entity::find()
            .filter(slot::Column::BatteryId.eq(battery_id))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Read for update the slot holding `battery_id`, only if it is in
    /// `status`.
    pub async fn lock_by_battery_with_status(
        &self,
        battery_id: i32,
        status: SlotStatus,
    ) -> DomainResult<Option<Slot>> {
        slot::Entity::find()
            .filter(slot::Column::BatteryId.eq(battery_id))
            .filter(slot::Column::Status.eq(status.as_str()))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    /// Create `count` empty slots numbered from 1.
    pub async fn insert_empty(&self, cabinet_id: i32, count: i32) -> DomainResult<Vec<Slot>> {
        let now = Utc::now();
        let mut slots = Vec::with_capacity(count.max(0) as usize);
        for number in 1..=count {
            let model = slot::ActiveModel {
                id: NotSet,
                cabinet_id: Set(cabinet_id),
                slot_number: Set(number),
                battery_id: Set(None),
                status: Set(SlotStatus::Empty.as_str().to_string()),
                updated_at: Set(now),
            }
            .insert(self.conn)
            .await?;
            slots.push(model_to_domain(model)?);
        }
        Ok(slots)
    }

    /// Persist battery and status, guarded by the status that was read.
    pub async fn save(&self, s: &Slot, expected: SlotStatus) -> DomainResult<()> {
        debug!(slot_id = s.id, from = %expected, to = %s.status, "Saving slot");

        let res = slot::Entity::update_many()
            .set(slot::ActiveModel {
                id: NotSet,
                cabinet_id: NotSet,
                slot_number: NotSet,
                battery_id: Set(s.battery_id),
                status: Set(s.status.as_str().to_string()),
                updated_at: Set(Utc::now()),
            })
            .filter(slot::Column::Id.eq(s.id))
            .filter(slot::Column::Status.eq(expected.as_str()))
            .exec(self.conn)
            .await?;
        expect_one(res.rows_affected, "Slot", s.id)
    }

    pub async fn list_by_cabinet(&self, cabinet_id: i32) -> DomainResult<Vec<Slot>> {
        all_to_domain(
            slot::Entity::find()
                .filter(slot::Column::CabinetId.eq(cabinet_id))
                .order_by_asc(slot::Column::SlotNumber)
                .all(self.conn)
                .await?,
        )
    }

    pub async fn list_by_station(&self, station_id: i32) -> DomainResult<Vec<Slot>> {
        all_to_domain(
            slot::Entity::find()
                .inner_join(cabinet::Entity)
                .filter(cabinet::Column::StationId.eq(station_id))
                .order_by_asc(slot::Column::CabinetId)
                .order_by_asc(slot::Column::SlotNumber)
                .all(self.conn)
                .await?,
        )
    }

    /// Slots of a station holding a ready battery.
    pub async fn count_available(&self, station_id: i32) -> DomainResult<u64> {
        Ok(slot::Entity::find()
            .inner_join(cabinet::Entity)
            .filter(cabinet::Column::StationId.eq(station_id))
            .filter(slot::Column::Status.eq(SlotStatus::Available.as_str()))
            .count(self.conn)
            .await?)
    }
}
