//! Create transactions, membership_plans and user_memberships tables

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
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::OrderCode)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Transactions::CheckoutUrl).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipPlans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MembershipPlans::Name).string().not_null())
                    .col(ColumnDef::new(MembershipPlans::Description).text())
                    .col(ColumnDef::new(MembershipPlans::Price).big_integer().not_null())
                    .col(ColumnDef::new(MembershipPlans::DurationDays).integer().not_null())
                    .col(ColumnDef::new(MembershipPlans::SwapLimit).integer().not_null())
                    .col(
                        ColumnDef::new(MembershipPlans::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(MembershipPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserMemberships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserMemberships::UserId).integer().not_null())
                    .col(ColumnDef::new(UserMemberships::PlanId).integer().not_null())
                    .col(ColumnDef::new(UserMemberships::TransactionId).integer())
                    .col(ColumnDef::new(UserMemberships::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserMemberships::ExpiredDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UserMemberships::RemainingSwaps)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_memberships_user")
                            .from(UserMemberships::Table, UserMemberships::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_memberships_plan")
                            .from(UserMemberships::Table, UserMemberships::PlanId)
                            .to(MembershipPlans::Table, MembershipPlans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_memberships_user_status")
                    .table(UserMemberships::Table)
                    .col(UserMemberships::UserId)
                    .col(UserMemberships::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserMemberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Transactions {
    Table,
    Id,
    UserId,
    OrderCode,
    Amount,
    Kind,
    Status,
    CheckoutUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum MembershipPlans {
    Table,
    Id,
    Name,
    Description,
    Price,
    DurationDays,
    SwapLimit,
    Status,
    CreatedAt,
}

#[derive(Iden)]
pub enum UserMemberships {
    Table,
    Id,
    UserId,
    PlanId,
    TransactionId,
    StartDate,
    ExpiredDate,
    RemainingSwaps,
    Status,
    CreatedAt,
    UpdatedAt,
}
