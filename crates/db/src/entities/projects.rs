//! `SeaORM` Entity for the projects table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub sales_team_id: Option<Uuid>,
    pub project_name: String,
    pub requirements: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub budget: Option<Decimal>,
    pub deadline: Option<Date>,
    /// Contracted hour ceiling; refreshed from the sum of task hours at
    /// approval time.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_hours: Decimal,
    /// Cumulative hours credited by timesheet approvals.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_working_hours: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::SalesTeamId",
        to = "super::teams::Column::Id"
    )]
    Teams,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::project_members::Entity")]
    ProjectMembers,
    #[sea_orm(has_many = "super::timesheet_entries::Entity")]
    TimesheetEntries,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectMembers.def()
    }
}

impl Related<super::timesheet_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimesheetEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
