//! `SeaORM` Entity for the accessories table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accessories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub detail: Option<String>,
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accessory_categories::Entity",
        from = "Column::CategoryId",
        to = "super::accessory_categories::Column::Id"
    )]
    AccessoryCategories,
    #[sea_orm(has_many = "super::accessory_assignments::Entity")]
    AccessoryAssignments,
}

impl Related<super::accessory_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessoryCategories.def()
    }
}

impl Related<super::accessory_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessoryAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
