//! Battery entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "batteries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub battery_type_id: i32,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub model: String,
    /// Current charge in percent
    pub capacity: f64,
    pub cycle_count: i32,
    pub health_score: f64,
    /// AVAILABLE, IN_USE, CHARGING, RESERVED, DAMAGED, RETIRED
    pub status: String,
    #[sea_orm(nullable)]
    pub vehicle_id: Option<i32>,
    pub in_transfer: bool,
    #[sea_orm(nullable)]
    pub estimated_full_charge_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::battery_type::Entity",
        from = "Column::BatteryTypeId",
        to = "super::battery_type::Column::Id"
    )]
    BatteryType,
}

impl Related<super::battery_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BatteryType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
