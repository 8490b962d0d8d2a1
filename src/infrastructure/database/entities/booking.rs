//! Booking entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub station_id: i32,
    #[sea_orm(nullable)]
    pub user_membership_id: Option<i32>,
    #[sea_orm(nullable)]
    pub transaction_id: Option<i32>,
    pub expected_pickup_time: DateTimeUtc,
    pub distance_km: f64,
    pub travel_minutes: i64,
    /// PENDING, RESERVED, IN_PROGRESS, COMPLETED, CANCELLED, EXPIRED
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_detail::Entity")]
    Details,
}

impl Related<super::booking_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
