//! Create transfer_requests and transfer_request_details tables

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;
use super::m20250101_000003_create_stations::{Batteries, Stations};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransferRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransferRequests::FromStationId).integer().not_null())
                    .col(ColumnDef::new(TransferRequests::ToStationId).integer().not_null())
                    .col(ColumnDef::new(TransferRequests::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(TransferRequests::Note).text())
                    .col(
                        ColumnDef::new(TransferRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_from_station")
                            .from(TransferRequests::Table, TransferRequests::FromStationId)
                            .to(Stations::Table, Stations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_to_station")
                            .from(TransferRequests::Table, TransferRequests::ToStationId)
                            .to(Stations::Table, Stations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_requests_created_by")
                            .from(TransferRequests::Table, TransferRequests::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransferRequestDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferRequestDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransferRequestDetails::RequestId).integer().not_null())
                    .col(ColumnDef::new(TransferRequestDetails::BatteryId).integer().not_null())
                    .col(
                        ColumnDef::new(TransferRequestDetails::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_request_details_request")
                            .from(TransferRequestDetails::Table, TransferRequestDetails::RequestId)
                            .to(TransferRequests::Table, TransferRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_request_details_battery")
                            .from(TransferRequestDetails::Table, TransferRequestDetails::BatteryId)
                            .to(Batteries::Table, Batteries::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransferRequestDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransferRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TransferRequests {
    Table,
    Id,
    FromStationId,
    ToStationId,
    CreatedBy,
    Note,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum TransferRequestDetails {
    Table,
    Id,
    RequestId,
    BatteryId,
    Status,
}
