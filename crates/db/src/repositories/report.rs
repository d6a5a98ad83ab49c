//! Working-hour reports.
//!
//! Durations are stored as the `HH:MM` strings employees report in, so
//! aggregation parses them through `Hours` rather than summing in SQL.
//! Entries with malformed durations are skipped with a warning instead of
//! failing the whole report.

use chrono::{Duration, NaiveDate};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::warn;
use uuid::Uuid;

use epm_core::timesheet::SheetStatus;
use epm_shared::Hours;

use crate::entities::{projects, timesheet_entries};

/// Hour totals for one project.
#[derive(Debug, Clone)]
pub struct ProjectHoursRow {
    /// Project ID.
    pub project_id: Uuid,
    /// Project name.
    pub project_name: String,
    /// Contracted hour ceiling.
    pub total_hours: Hours,
    /// Hours credited by approvals.
    pub total_working_hours: Hours,
}

/// Approved hours worked on one day.
#[derive(Debug, Clone, Copy)]
pub struct DayHours {
    /// The day.
    pub date: NaiveDate,
    /// Approved hours reported for that day.
    pub hours: Hours,
}

/// One project's share of an employee's approved hours.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeProjectHours {
    /// Project; `None` groups in-house entries.
    pub project_id: Option<Uuid>,
    /// Approved hours.
    pub hours: Hours,
}

/// Report repository over projects and approved timesheet entries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hour totals per project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_hours(&self) -> Result<Vec<ProjectHoursRow>, DbErr> {
        let rows = projects::Entity::find()
            .order_by_asc(projects::Column::ProjectName)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|p| ProjectHoursRow {
                project_id: p.id,
                project_name: p.project_name,
                total_hours: Hours::from_decimal(p.total_hours).unwrap_or(Hours::ZERO),
                total_working_hours: Hours::from_decimal(p.total_working_hours)
                    .unwrap_or(Hours::ZERO),
            })
            .collect())
    }

    /// Approved hours per day for one project over seven days from
    /// `week_start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn weekly_project_hours(
        &self,
        project_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Vec<DayHours>, DbErr> {
        let week_end = week_start + Duration::days(7);

        let entries = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::ProjectId.eq(project_id))
            .filter(timesheet_entries::Column::Status.eq(SheetStatus::Approved.as_str()))
            .filter(timesheet_entries::Column::Date.gte(week_start))
            .filter(timesheet_entries::Column::Date.lt(week_end))
            .all(&self.db)
            .await?;

        let mut days: Vec<DayHours> = (0..7)
            .map(|offset| DayHours {
                date: week_start + Duration::days(offset),
                hours: Hours::ZERO,
            })
            .collect();

        for entry in entries {
            let Ok(duration) = Hours::parse(&entry.duration) else {
                warn!(entry_id = %entry.id, duration = %entry.duration,
                    "Skipping entry with malformed duration in report");
                continue;
            };
            if let Some(day) = days.iter_mut().find(|d| d.date == entry.date) {
                day.hours += duration;
            }
        }

        Ok(days)
    }

    /// One employee's approved hours, total and per project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn employee_hours(
        &self,
        user_id: Uuid,
    ) -> Result<(Hours, Vec<EmployeeProjectHours>), DbErr> {
        let entries = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::UserId.eq(user_id))
            .filter(timesheet_entries::Column::Status.eq(SheetStatus::Approved.as_str()))
            .all(&self.db)
            .await?;

        let mut total = Hours::ZERO;
        let mut per_project: Vec<EmployeeProjectHours> = Vec::new();

        for entry in entries {
            let Ok(duration) = Hours::parse(&entry.duration) else {
                warn!(entry_id = %entry.id, duration = %entry.duration,
                    "Skipping entry with malformed duration in report");
                continue;
            };

            total += duration;
            match per_project
                .iter_mut()
                .find(|p| p.project_id == entry.project_id)
            {
                Some(bucket) => bucket.hours += duration,
                None => per_project.push(EmployeeProjectHours {
                    project_id: entry.project_id,
                    hours: duration,
                }),
            }
        }

        Ok((total, per_project))
    }
}
