//! Client repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::clients;

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    /// Client name.
    pub name: String,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Platform the client was hired through.
    pub hire_through: Option<String>,
    /// The client's own project identifier on that platform.
    pub client_project_id: Option<String>,
    /// Company name.
    pub company_name: Option<String>,
    /// Company address.
    pub company_address: Option<String>,
}

/// Input for updating a client; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    /// Client name.
    pub name: Option<String>,
    /// Contact email (`Some(None)` clears it).
    pub contact_email: Option<Option<String>>,
    /// Platform the client was hired through (`Some(None)` clears it).
    pub hire_through: Option<Option<String>>,
    /// Client-side project identifier (`Some(None)` clears it).
    pub client_project_id: Option<Option<String>>,
    /// Company name (`Some(None)` clears it).
    pub company_name: Option<Option<String>>,
    /// Company address (`Some(None)` clears it).
    pub company_address: Option<Option<String>>,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(&self, input: CreateClientInput) -> Result<clients::Model, DbErr> {
        let now = Utc::now().into();

        clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            contact_email: Set(input.contact_email),
            hire_through: Set(input.hire_through),
            client_project_id: Set(input.client_project_id),
            company_name: Set(input.company_name),
            company_address: Set(input.company_address),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Updates a client. Returns `None` if the client does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateClientInput,
    ) -> Result<Option<clients::Model>, DbErr> {
        let Some(client) = clients::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: clients::ActiveModel = client.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(contact_email) = input.contact_email {
            active.contact_email = Set(contact_email);
        }
        if let Some(hire_through) = input.hire_through {
            active.hire_through = Set(hire_through);
        }
        if let Some(client_project_id) = input.client_project_id {
            active.client_project_id = Set(client_project_id);
        }
        if let Some(company_name) = input.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(company_address) = input.company_address {
            active.company_address = Set(company_address);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a client. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = clients::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a client by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<clients::Model>, DbErr> {
        clients::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all clients, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<clients::Model>, DbErr> {
        clients::Entity::find()
            .order_by_desc(clients::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
