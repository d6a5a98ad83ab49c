//! Accessory (asset) tracking repository: categories, items, assignments.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{accessories, accessory_assignments, accessory_categories, users};

/// Errors that can occur during accessory operations.
#[derive(Debug, Error)]
pub enum AccessoryError {
    /// Category not found.
    #[error("Accessory category {0} not found")]
    CategoryNotFound(Uuid),

    /// Accessory not found.
    #[error("Accessory {0} not found")]
    NotFound(Uuid),

    /// Assignment not found.
    #[error("Accessory assignment {0} not found")]
    AssignmentNotFound(Uuid),

    /// Referenced user does not exist.
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Input for creating or updating an accessory.
#[derive(Debug, Clone)]
pub struct AccessoryInput {
    /// Category the accessory belongs to.
    pub category_id: Uuid,
    /// Accessory name.
    pub name: String,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Free-text details.
    pub detail: Option<String>,
    /// Units on hand.
    pub quantity: i32,
}

/// Input for assigning an accessory to a user.
#[derive(Debug, Clone)]
pub struct AssignmentInput {
    /// Accessory to hand out.
    pub accessory_id: Uuid,
    /// Receiving user.
    pub user_id: Uuid,
    /// Hand-out date.
    pub assigned_on: NaiveDate,
    /// Free-text note.
    pub note: Option<String>,
}

/// Accessory repository.
#[derive(Debug, Clone)]
pub struct AccessoryRepository {
    db: DatabaseConnection,
}

impl AccessoryRepository {
    /// Creates a new accessory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. duplicate name).
    pub async fn create_category(
        &self,
        name: String,
    ) -> Result<accessory_categories::Model, AccessoryError> {
        let now = Utc::now().into();

        accessory_categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Renames a category.
    ///
    /// # Errors
    ///
    /// Returns `AccessoryError::CategoryNotFound` if it does not exist.
    pub async fn rename_category(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<accessory_categories::Model, AccessoryError> {
        let category = accessory_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?
            .ok_or(AccessoryError::CategoryNotFound(id))?;

        let mut active: accessory_categories::ActiveModel = category.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Deletes a category. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AccessoryError> {
        let result = accessory_categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_category(
        &self,
        id: Uuid,
    ) -> Result<Option<accessory_categories::Model>, AccessoryError> {
        accessory_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Lists categories alphabetically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_categories(
        &self,
    ) -> Result<Vec<accessory_categories::Model>, AccessoryError> {
        accessory_categories::Entity::find()
            .order_by_asc(accessory_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Accessories
    // ------------------------------------------------------------------

    /// Creates an accessory.
    ///
    /// # Errors
    ///
    /// Returns `AccessoryError::CategoryNotFound` if the category is missing.
    pub async fn create_accessory(
        &self,
        input: AccessoryInput,
    ) -> Result<accessories::Model, AccessoryError> {
        if self.find_category(input.category_id).await?.is_none() {
            return Err(AccessoryError::CategoryNotFound(input.category_id));
        }

        let now = Utc::now().into();
        accessories::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(input.category_id),
            name: Set(input.name),
            serial_number: Set(input.serial_number),
            detail: Set(input.detail),
            quantity: Set(input.quantity),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Replaces an accessory's fields.
    ///
    /// # Errors
    ///
    /// Returns `AccessoryError::NotFound` or `CategoryNotFound`.
    pub async fn update_accessory(
        &self,
        id: Uuid,
        input: AccessoryInput,
    ) -> Result<accessories::Model, AccessoryError> {
        if self.find_category(input.category_id).await?.is_none() {
            return Err(AccessoryError::CategoryNotFound(input.category_id));
        }

        let accessory = accessories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?
            .ok_or(AccessoryError::NotFound(id))?;

        let mut active: accessories::ActiveModel = accessory.into();
        active.category_id = Set(input.category_id);
        active.name = Set(input.name);
        active.serial_number = Set(input.serial_number);
        active.detail = Set(input.detail);
        active.quantity = Set(input.quantity);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Deletes an accessory. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_accessory(&self, id: Uuid) -> Result<bool, AccessoryError> {
        let result = accessories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Finds an accessory by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_accessory(&self, id: Uuid) -> Result<Option<accessories::Model>, AccessoryError> {
        accessories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Lists accessories with their categories, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accessories(
        &self,
    ) -> Result<Vec<(accessories::Model, Option<accessory_categories::Model>)>, AccessoryError>
    {
        accessories::Entity::find()
            .find_also_related(accessory_categories::Entity)
            .order_by_desc(accessories::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------

    /// Hands an accessory out to a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` / `UserNotFound` if either side is missing.
    pub async fn create_assignment(
        &self,
        input: AssignmentInput,
    ) -> Result<accessory_assignments::Model, AccessoryError> {
        if self.find_accessory(input.accessory_id).await?.is_none() {
            return Err(AccessoryError::NotFound(input.accessory_id));
        }

        let user = users::Entity::find_by_id(input.user_id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?;
        if user.is_none() {
            return Err(AccessoryError::UserNotFound(input.user_id));
        }

        let now = Utc::now().into();
        accessory_assignments::ActiveModel {
            id: Set(Uuid::new_v4()),
            accessory_id: Set(input.accessory_id),
            user_id: Set(input.user_id),
            assigned_on: Set(input.assigned_on),
            returned_on: Set(None),
            note: Set(input.note),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Marks an assignment as returned.
    ///
    /// # Errors
    ///
    /// Returns `AccessoryError::AssignmentNotFound` if it does not exist.
    pub async fn return_assignment(
        &self,
        id: Uuid,
        returned_on: NaiveDate,
    ) -> Result<accessory_assignments::Model, AccessoryError> {
        let assignment = accessory_assignments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?
            .ok_or(AccessoryError::AssignmentNotFound(id))?;

        let mut active: accessory_assignments::ActiveModel = assignment.into();
        active.returned_on = Set(Some(returned_on));
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }

    /// Deletes an assignment. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_assignment(&self, id: Uuid) -> Result<bool, AccessoryError> {
        let result = accessory_assignments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Lists assignments, newest first; optionally only one user's.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_assignments(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<accessory_assignments::Model>, AccessoryError> {
        let mut query = accessory_assignments::Entity::find();
        if let Some(user_id) = user_id {
            query = query.filter(accessory_assignments::Column::UserId.eq(user_id));
        }

        query
            .order_by_desc(accessory_assignments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AccessoryError::Database(e.to_string()))
    }
}
