//! Transfer request entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transfer_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub created_by: i32,
    #[sea_orm(nullable)]
    pub note: Option<String>,
    /// PENDING, TRANSFERRING, COMPLETED, CANCELLED
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_request_detail::Entity")]
    Details,
}

impl Related<super::transfer_request_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
