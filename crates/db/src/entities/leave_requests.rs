//! `SeaORM` Entity for the leave_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    /// "Full Leave", "Short Leave", "Half Day" or "Multiple Days Leave".
    pub leave_type: String,
    /// Hours away; only set for Short Leave.
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub hours: Option<Decimal>,
    pub reason: String,
    /// "pending", "approved" or "rejected".
    pub status: String,
    /// Manager who decided the request.
    pub decided_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
