//! Project repository: CRUD plus member assignment.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::entities::{clients, project_members, projects, users};

/// Errors that can occur during project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Project not found.
    #[error("Project {0} not found")]
    NotFound(Uuid),

    /// Referenced client does not exist.
    #[error("Client {0} not found")]
    ClientNotFound(Uuid),

    /// Referenced user does not exist.
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// The user is already a member of the project.
    #[error("User {user_id} is already assigned to project {project_id}")]
    AlreadyMember {
        /// The project.
        project_id: Uuid,
        /// The user.
        user_id: Uuid,
    },

    /// The user is not a member of the project.
    #[error("User {user_id} is not assigned to project {project_id}")]
    MemberNotFound {
        /// The project.
        project_id: Uuid,
        /// The user.
        user_id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Owning client.
    pub client_id: Uuid,
    /// Sales team credited with the project.
    pub sales_team_id: Option<Uuid>,
    /// Project name.
    pub project_name: String,
    /// Requirements description.
    pub requirements: Option<String>,
    /// Monetary budget.
    pub budget: Option<Decimal>,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Input for updating a project; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    /// Owning client.
    pub client_id: Option<Uuid>,
    /// Sales team (`Some(None)` clears it).
    pub sales_team_id: Option<Option<Uuid>>,
    /// Project name.
    pub project_name: Option<String>,
    /// Requirements description (`Some(None)` clears it).
    pub requirements: Option<Option<String>>,
    /// Monetary budget (`Some(None)` clears it).
    pub budget: Option<Option<Decimal>>,
    /// Delivery deadline (`Some(None)` clears it).
    pub deadline: Option<Option<NaiveDate>>,
}

/// Project repository.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a project with zeroed hour counters.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::ClientNotFound` if the client does not exist.
    pub async fn create(&self, input: CreateProjectInput) -> Result<projects::Model, ProjectError> {
        let client = clients::Entity::find_by_id(input.client_id)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;
        if client.is_none() {
            return Err(ProjectError::ClientNotFound(input.client_id));
        }

        let now = Utc::now().into();
        let project = projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(input.client_id),
            sales_team_id: Set(input.sales_team_id),
            project_name: Set(input.project_name),
            requirements: Set(input.requirements),
            budget: Set(input.budget),
            deadline: Set(input.deadline),
            total_hours: Set(Decimal::ZERO),
            total_working_hours: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

        info!(project_id = %project.id, name = %project.project_name, "Project created");
        Ok(project)
    }

    /// Updates a project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` if the project does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<projects::Model, ProjectError> {
        let project = projects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?
            .ok_or(ProjectError::NotFound(id))?;

        let mut active: projects::ActiveModel = project.into();
        if let Some(client_id) = input.client_id {
            active.client_id = Set(client_id);
        }
        if let Some(sales_team_id) = input.sales_team_id {
            active.sales_team_id = Set(sales_team_id);
        }
        if let Some(project_name) = input.project_name {
            active.project_name = Set(project_name);
        }
        if let Some(requirements) = input.requirements {
            active.requirements = Set(requirements);
        }
        if let Some(budget) = input.budget {
            active.budget = Set(budget);
        }
        if let Some(deadline) = input.deadline {
            active.deadline = Set(deadline);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    /// Deletes a project. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ProjectError> {
        let result = projects::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a project by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<projects::Model>, ProjectError> {
        projects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    /// Lists all projects with their clients, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_with_clients(
        &self,
    ) -> Result<Vec<(projects::Model, Option<clients::Model>)>, ProjectError> {
        projects::Entity::find()
            .find_also_related(clients::Entity)
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    /// Assigns a user to a project.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMember` if the assignment exists, `NotFound` /
    /// `UserNotFound` if either side is missing.
    pub async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> Result<project_members::Model, ProjectError> {
        if self.find_by_id(project_id).await?.is_none() {
            return Err(ProjectError::NotFound(project_id));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;
        if user.is_none() {
            return Err(ProjectError::UserNotFound(user_id));
        }

        let existing = project_members::Entity::find_by_id((project_id, user_id))
            .one(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(ProjectError::AlreadyMember {
                project_id,
                user_id,
            });
        }

        let member = project_members::ActiveModel {
            project_id: Set(project_id),
            user_id: Set(user_id),
            assigned_by: Set(assigned_by),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

        info!(project_id = %project_id, user_id = %user_id, "Project member assigned");
        Ok(member)
    }

    /// Removes a user from a project.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if there is no such assignment.
    pub async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), ProjectError> {
        let result = project_members::Entity::delete_by_id((project_id, user_id))
            .exec(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(ProjectError::MemberNotFound {
                project_id,
                user_id,
            });
        }

        info!(project_id = %project_id, user_id = %user_id, "Project member removed");
        Ok(())
    }

    /// Lists the users assigned to a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn members(&self, project_id: Uuid) -> Result<Vec<users::Model>, ProjectError> {
        users::Entity::find()
            .join(
                JoinType::InnerJoin,
                project_members::Relation::Users.def().rev(),
            )
            .filter(project_members::Column::ProjectId.eq(project_id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    /// Lists the projects a user is assigned to, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn assigned_to_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<projects::Model>, ProjectError> {
        projects::Entity::find()
            .join(
                JoinType::InnerJoin,
                projects::Relation::ProjectMembers.def(),
            )
            .filter(project_members::Column::UserId.eq(user_id))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ProjectError::Database(e.to_string()))
    }
}
