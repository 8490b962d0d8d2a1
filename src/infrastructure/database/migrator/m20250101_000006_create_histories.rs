//! Create slot_histories and battery_used_histories tables

use sea_orm_migration::prelude::*;

use super::m20250101_000003_create_stations::{Batteries, Slots};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SlotHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SlotHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SlotHistories::SlotId).integer().not_null())
                    .col(ColumnDef::new(SlotHistories::BatteryId).integer().not_null())
                    .col(ColumnDef::new(SlotHistories::BookingId).integer())
                    .col(ColumnDef::new(SlotHistories::TransferRequestId).integer())
                    .col(ColumnDef::new(SlotHistories::Action).string_len(8).not_null())
                    .col(
                        ColumnDef::new(SlotHistories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_slot_histories_slot")
                            .from(SlotHistories::Table, SlotHistories::SlotId)
                            .to(Slots::Table, Slots::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BatteryUsedHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BatteryUsedHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BatteryUsedHistories::BatteryId).integer().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::VehicleId).integer().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::BookingId).integer().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::CycleCount).integer().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::Capacity).double().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::HealthScore).double().not_null())
                    .col(ColumnDef::new(BatteryUsedHistories::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(BatteryUsedHistories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_battery_used_histories_battery")
                            .from(BatteryUsedHistories::Table, BatteryUsedHistories::BatteryId)
                            .to(Batteries::Table, Batteries::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BatteryUsedHistories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SlotHistories::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SlotHistories {
    Table,
    Id,
    SlotId,
    BatteryId,
    BookingId,
    TransferRequestId,
    Action,
    CreatedAt,
}

#[derive(Iden)]
pub enum BatteryUsedHistories {
    Table,
    Id,
    BatteryId,
    VehicleId,
    BookingId,
    CycleCount,
    Capacity,
    HealthScore,
    Price,
    CreatedAt,
}
