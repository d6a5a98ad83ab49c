//! Team repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::teams;

/// Team repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    db: DatabaseConnection,
}

impl TeamRepository {
    /// Creates a new team repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. duplicate name).
    pub async fn create(&self, name: String) -> Result<teams::Model, DbErr> {
        let now = Utc::now().into();

        teams::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Renames a team. Returns `None` if the team does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn rename(&self, id: Uuid, name: String) -> Result<Option<teams::Model>, DbErr> {
        let Some(team) = teams::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: teams::ActiveModel = team.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a team. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = teams::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a team by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<teams::Model>, DbErr> {
        teams::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a team by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<teams::Model>, DbErr> {
        teams::Entity::find()
            .filter(teams::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// Lists all teams alphabetically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<teams::Model>, DbErr> {
        teams::Entity::find()
            .order_by_asc(teams::Column::Name)
            .all(&self.db)
            .await
    }
}
