//! User membership entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_memberships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub plan_id: i32,
    #[sea_orm(nullable)]
    pub transaction_id: Option<i32>,
    #[sea_orm(nullable)]
    pub start_date: Option<DateTimeUtc>,
    /// Set on activation
    #[sea_orm(nullable)]
    pub expired_date: Option<DateTimeUtc>,
    pub remaining_swaps: i32,
    /// PENDING, ACTIVE, EXPIRED, CANCELLED
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::membership_plan::Entity",
        from = "Column::PlanId",
        to = "super::membership_plan::Column::Id"
    )]
    Plan,
}

impl Related<super::membership_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
