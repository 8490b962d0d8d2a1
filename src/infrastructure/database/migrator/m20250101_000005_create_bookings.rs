//! Create bookings and booking_details tables

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;
use super::m20250101_000002_create_vehicles::Vehicles;
use super::m20250101_000003_create_stations::{Batteries, Stations};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::UserId).integer().not_null())
                    .col(ColumnDef::new(Bookings::VehicleId).integer().not_null())
                    .col(ColumnDef::new(Bookings::StationId).integer().not_null())
                    .col(ColumnDef::new(Bookings::UserMembershipId).integer())
                    .col(ColumnDef::new(Bookings::TransactionId).integer())
                    .col(
                        ColumnDef::new(Bookings::ExpectedPickupTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::DistanceKm).double().not_null())
                    .col(ColumnDef::new(Bookings::TravelMinutes).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_vehicle")
                            .from(Bookings::Table, Bookings::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_station")
                            .from(Bookings::Table, Bookings::StationId)
                            .to(Stations::Table, Stations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status_pickup")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::ExpectedPickupTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookingDetails::BookingId).integer().not_null())
                    .col(ColumnDef::new(BookingDetails::BatteryId).integer().not_null())
                    .col(
                        ColumnDef::new(BookingDetails::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BookingDetails::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_details_booking")
                            .from(BookingDetails::Table, BookingDetails::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_details_battery")
                            .from(BookingDetails::Table, BookingDetails::BatteryId)
                            .to(Batteries::Table, Batteries::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    UserId,
    VehicleId,
    StationId,
    UserMembershipId,
    TransactionId,
    ExpectedPickupTime,
    DistanceKm,
    TravelMinutes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum BookingDetails {
    Table,
    Id,
    BookingId,
    BatteryId,
    Price,
    Status,
}
