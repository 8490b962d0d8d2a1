//! Create battery_types, vehicle_types and vehicles tables

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BatteryTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BatteryTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BatteryTypes::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(BatteryTypes::CapacityKwh).double().not_null())
                    .col(ColumnDef::new(BatteryTypes::ChargeRateHours).double())
                    .col(
                        ColumnDef::new(BatteryTypes::SwapPrice)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BatteryTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleTypes::Name).string().not_null())
                    .col(ColumnDef::new(VehicleTypes::BatteryTypeId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_types_battery_type")
                            .from(VehicleTypes::Table, VehicleTypes::BatteryTypeId)
                            .to(BatteryTypes::Table, BatteryTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::UserId).integer().not_null())
                    .col(ColumnDef::new(Vehicles::VehicleTypeId).integer().not_null())
                    .col(
                        ColumnDef::new(Vehicles::LicensePlate)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_user")
                            .from(Vehicles::Table, Vehicles::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_vehicle_type")
                            .from(Vehicles::Table, Vehicles::VehicleTypeId)
                            .to(VehicleTypes::Table, VehicleTypes::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BatteryTypes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BatteryTypes {
    Table,
    Id,
    Name,
    CapacityKwh,
    ChargeRateHours,
    SwapPrice,
    CreatedAt,
}

#[derive(Iden)]
pub enum VehicleTypes {
    Table,
    Id,
    Name,
    BatteryTypeId,
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    UserId,
    VehicleTypeId,
    LicensePlate,
    Status,
    CreatedAt,
}
