//! Task repository.
//!
//! Task hour estimates matter beyond task tracking itself: their per-project
//! sum is the contracted ceiling the timesheet approval rule allocates
//! against.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{projects, tasks};

/// Task workflow statuses.
pub const TASK_STATUSES: [&str; 3] = ["pending", "in progress", "completed"];

/// Errors that can occur during task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task not found.
    #[error("Task {0} not found")]
    NotFound(Uuid),

    /// Referenced project does not exist.
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// Status string outside the task workflow.
    #[error("Invalid task status {0:?}")]
    InvalidStatus(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Owning project.
    pub project_id: Uuid,
    /// Assigned employee.
    pub assigned_to: Option<Uuid>,
    /// Task title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Estimated hours; counts toward the project's contracted ceiling.
    pub hours: Decimal,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Input for updating a task; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    /// Assigned employee (`Some(None)` clears it).
    pub assigned_to: Option<Option<Uuid>>,
    /// Task title.
    pub title: Option<String>,
    /// Longer description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// Estimated hours.
    pub hours: Option<Decimal>,
    /// Workflow status.
    pub status: Option<String>,
    /// Delivery deadline (`Some(None)` clears it).
    pub deadline: Option<Option<NaiveDate>>,
}

/// Task repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    db: DatabaseConnection,
}

impl TaskRepository {
    /// Creates a new task repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true if `status` is part of the task workflow.
    #[must_use]
    pub fn is_valid_status(status: &str) -> bool {
        TASK_STATUSES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }

    /// Creates a task in "pending" status.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::ProjectNotFound` if the project does not exist.
    pub async fn create(&self, input: CreateTaskInput) -> Result<tasks::Model, TaskError> {
        let project = projects::Entity::find_by_id(input.project_id)
            .one(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))?;
        if project.is_none() {
            return Err(TaskError::ProjectNotFound(input.project_id));
        }

        let now = Utc::now().into();
        tasks::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(input.project_id),
            assigned_to: Set(input.assigned_to),
            title: Set(input.title),
            description: Set(input.description),
            hours: Set(input.hours),
            status: Set("pending".to_string()),
            deadline: Set(input.deadline),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| TaskError::Database(e.to_string()))
    }

    /// Updates a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` or `TaskError::InvalidStatus`.
    pub async fn update(&self, id: Uuid, input: UpdateTaskInput) -> Result<tasks::Model, TaskError> {
        if let Some(status) = &input.status
            && !Self::is_valid_status(status)
        {
            return Err(TaskError::InvalidStatus(status.clone()));
        }

        let task = tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))?
            .ok_or(TaskError::NotFound(id))?;

        let mut active: tasks::ActiveModel = task.into();
        if let Some(assigned_to) = input.assigned_to {
            active.assigned_to = Set(assigned_to);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(hours) = input.hours {
            active.hours = Set(hours);
        }
        if let Some(status) = input.status {
            active.status = Set(status.to_lowercase());
        }
        if let Some(deadline) = input.deadline {
            active.deadline = Set(deadline);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))
    }

    /// Deletes a task. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, TaskError> {
        let result = tasks::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a task by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tasks::Model>, TaskError> {
        tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))
    }

    /// Lists a project's tasks, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<tasks::Model>, TaskError> {
        tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .order_by_asc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))
    }

    /// Lists tasks assigned to one employee for one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_employee(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<tasks::Model>, TaskError> {
        tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .filter(tasks::Column::AssignedTo.eq(user_id))
            .order_by_asc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| TaskError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case("pending", true)]
    #[case("In Progress", true)]
    #[case("COMPLETED", true)]
    #[case("done", false)]
    #[case("", false)]
    fn test_valid_statuses(#[case] status: &str, #[case] expected: bool) {
        assert_eq!(TaskRepository::is_valid_status(status), expected);
    }
}
