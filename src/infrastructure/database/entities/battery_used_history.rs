//! Battery usage snapshot taken at every pickup

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "battery_used_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub battery_id: i32,
    pub vehicle_id: i32,
    pub booking_id: i32,
    pub cycle_count: i32,
    pub capacity: f64,
    pub health_score: f64,
    pub price: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
