//! Payment transaction entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// Order code known to the payment gateway
    #[sea_orm(unique)]
    pub order_code: i64,
    pub amount: i64,
    /// BOOKING, MEMBERSHIP
    pub kind: String,
    /// PENDING, PAID, FAILED, CANCELLED
    pub status: String,
    #[sea_orm(nullable)]
    pub checkout_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
