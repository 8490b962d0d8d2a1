//! Create stations, cabinets, batteries and slots tables

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_vehicles::BatteryTypes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stations::Name).string().not_null())
                    .col(ColumnDef::new(Stations::Address).string().not_null())
                    .col(ColumnDef::new(Stations::Latitude).double().not_null())
                    .col(ColumnDef::new(Stations::Longitude).double().not_null())
                    .col(ColumnDef::new(Stations::OpenTime).string_len(8))
                    .col(ColumnDef::new(Stations::CloseTime).string_len(8))
                    .col(
                        ColumnDef::new(Stations::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Stations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Stations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cabinets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cabinets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cabinets::StationId).integer().not_null())
                    .col(ColumnDef::new(Cabinets::BatteryTypeId).integer().not_null())
                    .col(ColumnDef::new(Cabinets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Cabinets::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Cabinets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cabinets_station")
                            .from(Cabinets::Table, Cabinets::StationId)
                            .to(Stations::Table, Stations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cabinets_battery_type")
                            .from(Cabinets::Table, Cabinets::BatteryTypeId)
                            .to(BatteryTypes::Table, BatteryTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Batteries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Batteries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Batteries::BatteryTypeId).integer().not_null())
                    .col(
                        ColumnDef::new(Batteries::SerialNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Batteries::Model).string().not_null())
                    .col(
                        ColumnDef::new(Batteries::Capacity)
                            .double()
                            .not_null()
                            .default(100.0),
                    )
                    .col(
                        ColumnDef::new(Batteries::CycleCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Batteries::HealthScore)
                            .double()
                            .not_null()
                            .default(100.0),
                    )
                    .col(
                        ColumnDef::new(Batteries::Status)
                            .string_len(20)
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(ColumnDef::new(Batteries::VehicleId).integer())
                    .col(
                        ColumnDef::new(Batteries::InTransfer)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Batteries::EstimatedFullChargeAt).timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(Batteries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Batteries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batteries_battery_type")
                            .from(Batteries::Table, Batteries::BatteryTypeId)
                            .to(BatteryTypes::Table, BatteryTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_batteries_status")
                    .table(Batteries::Table)
                    .col(Batteries::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Slots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Slots::CabinetId).integer().not_null())
                    .col(ColumnDef::new(Slots::SlotNumber).integer().not_null())
                    .col(ColumnDef::new(Slots::BatteryId).integer().unique_key())
                    .col(
                        ColumnDef::new(Slots::Status)
                            .string_len(20)
                            .not_null()
                            .default("EMPTY"),
                    )
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_slots_cabinet")
                            .from(Slots::Table, Slots::CabinetId)
                            .to(Cabinets::Table, Cabinets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_slots_battery")
                            .from(Slots::Table, Slots::BatteryId)
                            .to(Batteries::Table, Batteries::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_cabinet_number")
                    .table(Slots::Table)
                    .col(Slots::CabinetId)
                    .col(Slots::SlotNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Slots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Batteries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cabinets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Stations {
    Table,
    Id,
    Name,
    Address,
    Latitude,
    Longitude,
    OpenTime,
    CloseTime,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Cabinets {
    Table,
    Id,
    StationId,
    BatteryTypeId,
    Name,
    Status,
    CreatedAt,
}

#[derive(Iden)]
pub enum Batteries {
    Table,
    Id,
    BatteryTypeId,
    SerialNumber,
    Model,
    Capacity,
    CycleCount,
    HealthScore,
    Status,
    VehicleId,
    InTransfer,
    EstimatedFullChargeAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Slots {
    Table,
    Id,
    CabinetId,
    SlotNumber,
    BatteryId,
    Status,
    UpdatedAt,
}
