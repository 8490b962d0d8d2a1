//! Vehicle type entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicle_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Battery type the vehicle requires
    pub battery_type_id: i32,
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
