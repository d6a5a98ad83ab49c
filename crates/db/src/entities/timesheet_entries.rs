//! `SeaORM` Entity for the timesheet_entries table.
//!
//! One employee's reported time block for a date, tagged with a billing
//! category. Stored as typed columns; `duration` keeps the `HH:MM` string
//! the employee reported and is parsed by the approval rule.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "timesheet_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Null means in-house work with no client project attached.
    pub project_id: Option<Uuid>,
    pub date: Date,
    /// Reported duration as `HH:MM`.
    pub duration: String,
    pub work_type: String,
    /// "Billable", "Non Billable" or "Inhouse".
    pub activity_type: String,
    pub narration: Option<String>,
    /// Set by the allocation rule when an entry is split or reclassified.
    pub note: Option<String>,
    /// "pending", "approved" or "rejected".
    pub status: String,
    /// Manager who decided the entry.
    pub approved_by: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
