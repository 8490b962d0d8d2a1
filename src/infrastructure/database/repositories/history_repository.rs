//! Slot movement and battery usage history. Append-only.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{battery_used_history, slot_history};

pub struct HistoryRepository<'a, C> {
    conn: &'a C,
}

/// Direction of a battery movement through a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    In,
    Out,
}

impl SlotAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotAction::In => "IN",
            SlotAction::Out => "OUT",
        }
    }
}

/// What caused a slot movement
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotMovement {
    pub booking_id: Option<i32>,
    pub transfer_request_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct SlotHistoryEntry {
    pub slot_id: i32,
    pub battery_id: i32,
    pub booking_id: Option<i32>,
    pub transfer_request_id: Option<i32>,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BatteryUse {
    pub battery_id: i32,
    pub vehicle_id: i32,
    pub booking_id: i32,
    pub cycle_count: i32,
    pub capacity: f64,
    pub health_score: f64,
    pub price: i64,
}

impl<'a, C: ConnectionTrait> HistoryRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn record_slot(
        &self,
        slot_id: i32,
        battery_id: i32,
        action: SlotAction,
        cause: SlotMovement,
    ) -> DomainResult<()> {
        slot_history::ActiveModel {
            id: NotSet,
            slot_id: Set(slot_id),
            battery_id: Set(battery_id),
            booking_id: Set(cause.booking_id),
            transfer_request_id: Set(cause.transfer_request_id),
            action: Set(action.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn record_battery_use(&self, entry: BatteryUse) -> DomainResult<()> {
        battery_used_history::ActiveModel {
            id: NotSet,
            battery_id: Set(entry.battery_id),
            vehicle_id: Set(entry.vehicle_id),
            booking_id: Set(entry.booking_id),
            cycle_count: Set(entry.cycle_count),
            capacity: Set(entry.capacity),
            health_score: Set(entry.health_score),
            price: Set(entry.price),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn slot_history(&self, slot_id: i32) -> DomainResult<Vec<SlotHistoryEntry>> {
        Ok(slot_history::Entity::find()
            .filter(slot_history::Column::SlotId.eq(slot_id))
            .order_by_asc(slot_history::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(|m| SlotHistoryEntry {
                slot_id: m.slot_id,
                battery_id: m.battery_id,
                booking_id: m.booking_id,
                transfer_request_id: m.transfer_request_id,
                action: m.action,
                created_at: m.created_at,
            })
            .collect())
    }

    pub async fn battery_uses(&self, battery_id: i32) -> DomainResult<Vec<BatteryUse>> {
        Ok(battery_used_history::Entity::find()
            .filter(battery_used_history::Column::BatteryId.eq(battery_id))
            .order_by_asc(battery_used_history::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(|m| BatteryUse {
                battery_id: m.battery_id,
                vehicle_id: m.vehicle_id,
                booking_id: m.booking_id,
                cycle_count: m.cycle_count,
                capacity: m.capacity,
                health_score: m.health_score,
                price: m.price,
            })
            .collect())
    }
}
